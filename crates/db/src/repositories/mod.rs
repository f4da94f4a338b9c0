//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod character_repo;
pub mod profile_repo;
pub mod user_repo;

pub use character_repo::CharacterRepo;
pub use profile_repo::ProfileRepo;
pub use user_repo::UserRepo;
