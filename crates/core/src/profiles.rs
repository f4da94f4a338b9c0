//! Profile invariants and defaults.

use crate::gating::ProfileKind;

/// Hard cap on viewing profiles per account.
pub const MAX_PROFILES_PER_USER: i64 = 5;

/// Avatar used for profiles created without one.
pub const DEFAULT_PROFILE_AVATAR: &str =
    "https://rickandmortyapi.com/api/character/avatar/1.jpeg";

pub const DEFAULT_ADULT_AGE: i32 = 18;
pub const DEFAULT_CHILD_AGE: i32 = 12;

/// Default profile age when none is supplied at creation.
pub fn default_age(kind: ProfileKind) -> i32 {
    match kind {
        ProfileKind::Adult => DEFAULT_ADULT_AGE,
        ProfileKind::Child => DEFAULT_CHILD_AGE,
    }
}

/// Name of the profile created automatically at registration.
pub fn default_profile_name(user_name: &str) -> String {
    format!("{user_name}'s Profile")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
