//! Well-known role name constants.
//!
//! These must match the `role` column values seeded by the users
//! migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Whether a role string grants administrative privileges.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}
