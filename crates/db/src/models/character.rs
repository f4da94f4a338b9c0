//! Custom character model and DTOs.

use sqlx::FromRow;

use portal_core::characters::{CharacterStatus, Gender};
use portal_core::gating::AgeTag;
use portal_core::types::{DbId, Timestamp};

/// Full character row from the `characters` table.
///
/// The free-text `type` column (the remote catalog's subtype field, e.g.
/// "Parasite") maps to the Rust field `kind`.
#[derive(Debug, Clone, FromRow)]
pub struct Character {
    pub id: DbId,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub status: CharacterStatus,
    pub species: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    #[sqlx(try_from = "String")]
    pub gender: Gender,
    pub origin_name: String,
    pub location_name: String,
    pub image: String,
    #[sqlx(try_from = "String")]
    pub age_restriction: AgeTag,
    pub creator_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Character row joined with its creator's display name.
#[derive(Debug, Clone, FromRow)]
pub struct CharacterWithCreator {
    #[sqlx(flatten)]
    pub character: Character,
    pub creator_name: String,
}

/// DTO for inserting a character. Defaults are applied by the caller, not
/// the schema, so the inserted row round-trips exactly.
#[derive(Debug, Clone)]
pub struct CreateCharacter {
    pub name: String,
    pub status: CharacterStatus,
    pub species: String,
    pub kind: String,
    pub gender: Gender,
    pub origin_name: String,
    pub location_name: String,
    pub image: String,
    pub age_restriction: AgeTag,
    pub creator_id: DbId,
}

/// DTO for partial character updates. `None` fields keep their values.
#[derive(Debug, Clone, Default)]
pub struct UpdateCharacter {
    pub name: Option<String>,
    pub status: Option<CharacterStatus>,
    pub species: Option<String>,
    pub kind: Option<String>,
    pub gender: Option<Gender>,
    pub origin_name: Option<String>,
    pub location_name: Option<String>,
    pub image: Option<String>,
    pub age_restriction: Option<AgeTag>,
}

/// Filters shared by the character listing and search queries.
#[derive(Debug, Clone, Default)]
pub struct CharacterFilter {
    /// Case-insensitive substring match on the name.
    pub name: Option<String>,
    /// Restrict to rows created by this user.
    pub creator_id: Option<DbId>,
    /// Drop adult-tagged rows (child-profile viewer).
    pub all_ages_only: bool,
}
