//! Viewing profile model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use portal_core::gating::ProfileKind;
use portal_core::types::{DbId, Timestamp};

/// Full profile row from the `profiles` table.
///
/// `kind` is exposed on the wire as `type` (the field name the existing
/// client sends and expects). `favorites` holds canonical character
/// references (`"42"`, `"api-7"`) in insertion order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub avatar: String,
    pub age: i32,
    #[sqlx(try_from = "String")]
    #[serde(rename = "type")]
    pub kind: ProfileKind,
    pub favorites: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a profile.
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub user_id: DbId,
    pub name: String,
    pub avatar: String,
    pub age: i32,
    pub kind: ProfileKind,
}

/// DTO for partial profile updates. `None` fields keep their values.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub age: Option<i32>,
    pub kind: Option<ProfileKind>,
}
