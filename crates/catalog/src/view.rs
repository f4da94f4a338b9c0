//! Unified character view served by every read path.
//!
//! Local rows and remote catalog records flatten into one shape so
//! clients render both without caring which source a record came from.
//! The `id` field carries the canonical reference string (`"42"` local,
//! `"api-7"` remote); `api_id` and `is_custom` disambiguate explicitly.

use serde::{Deserialize, Serialize};

use portal_core::characters::{CharacterStatus, Gender};
use portal_core::gating::AgeTag;
use portal_core::refs::CharacterRef;
use portal_core::types::{DbId, Timestamp};
use portal_db::models::character::{Character, CharacterWithCreator};

use crate::remote::RemoteCharacter;

/// Origin/location sub-object, matching the remote catalog's wire shape.
/// Local rows store only a place name, so their `url` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterPlace {
    pub name: String,
    pub url: String,
}

/// Creator attribution on locally stored characters.
#[derive(Debug, Clone, Serialize)]
pub struct CreatorInfo {
    pub id: DbId,
    pub name: String,
}

/// One character as served to clients, regardless of source.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterView {
    /// Canonical reference string: `"42"` for local, `"api-7"` for remote.
    pub id: String,
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: Gender,
    pub origin: CharacterPlace,
    pub location: CharacterPlace,
    pub image: String,
    /// Creation time in whichever source owns the record.
    pub created: Timestamp,
    /// Remote catalog id; `None` for local rows.
    pub api_id: Option<i64>,
    pub is_custom: bool,
    pub age_restriction: AgeTag,
    /// Present on local rows only.
    pub creator: Option<CreatorInfo>,
}

impl CharacterView {
    /// View of a locally stored custom character.
    pub fn from_custom(character: Character, creator: Option<CreatorInfo>) -> Self {
        Self {
            id: CharacterRef::Local(character.id).to_string(),
            name: character.name,
            status: character.status,
            species: character.species,
            kind: character.kind,
            gender: character.gender,
            origin: CharacterPlace {
                name: character.origin_name,
                url: String::new(),
            },
            location: CharacterPlace {
                name: character.location_name,
                url: String::new(),
            },
            image: character.image,
            created: character.created_at,
            api_id: None,
            is_custom: true,
            age_restriction: character.age_restriction,
            creator,
        }
    }

    /// View of a joined row from the listing and favorites queries.
    pub fn from_custom_with_creator(row: CharacterWithCreator) -> Self {
        let creator = CreatorInfo {
            id: row.character.creator_id,
            name: row.creator_name,
        };
        Self::from_custom(row.character, Some(creator))
    }

    /// View of a remote catalog record. The catalog carries no age
    /// metadata, so the tag is derived from the remote id.
    pub fn from_remote(remote: RemoteCharacter) -> Self {
        Self {
            id: CharacterRef::Remote(remote.id).to_string(),
            name: remote.name,
            status: remote.status,
            species: remote.species,
            kind: remote.kind,
            gender: remote.gender,
            origin: remote.origin,
            location: remote.location,
            image: remote.image,
            created: remote.created,
            api_id: Some(remote.id),
            is_custom: false,
            age_restriction: AgeTag::for_remote_id(remote.id),
            creator: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
