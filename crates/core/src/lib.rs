//! Domain vocabulary for the character portal.
//!
//! Zero-I/O building blocks shared by the persistence, catalog and API
//! layers: id types, the error type, typed character references, the
//! age-gating policy and pagination rules.

pub mod characters;
pub mod error;
pub mod gating;
pub mod pagination;
pub mod profiles;
pub mod refs;
pub mod roles;
pub mod types;
