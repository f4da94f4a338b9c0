//! Typed references into the two character id spaces.
//!
//! A favorites entry or URL path id names either a locally stored custom
//! character (canonical form `"42"`) or a record in the remote catalog
//! (canonical form `"api-7"`). The string form is decoded exactly once at
//! the HTTP edge; everything downstream passes the typed value and never
//! re-parses prefixes.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::DbId;

/// Prefix marking a reference into the remote catalog id space.
pub const REMOTE_REF_PREFIX: &str = "api-";

/// A character reference in either id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterRef {
    /// Row id of a user-created character.
    Local(DbId),
    /// Id of a record in the remote catalog.
    Remote(i64),
}

impl CharacterRef {
    pub fn is_remote(&self) -> bool {
        matches!(self, CharacterRef::Remote(_))
    }
}

impl FromStr for CharacterRef {
    type Err = CoreError;

    /// Strict parse: a positive decimal id, optionally prefixed `api-`.
    /// Anything else (zero, negative, empty, non-numeric) is rejected.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (remote, digits) = match raw.strip_prefix(REMOTE_REF_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        match digits.parse::<i64>() {
            Ok(id) if id > 0 => Ok(if remote {
                CharacterRef::Remote(id)
            } else {
                CharacterRef::Local(id)
            }),
            _ => Err(CoreError::Validation(format!(
                "Invalid character reference '{raw}'"
            ))),
        }
    }
}

impl fmt::Display for CharacterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharacterRef::Local(id) => write!(f, "{id}"),
            CharacterRef::Remote(id) => write!(f, "{REMOTE_REF_PREFIX}{id}"),
        }
    }
}

/// Partition stored reference strings into (local ids, remote ids),
/// preserving order within each space. Entries that fail to parse are
/// skipped; the strict parse at write time keeps them out of the database
/// in the first place.
pub fn partition_refs(refs: &[String]) -> (Vec<DbId>, Vec<i64>) {
    let mut local = Vec::new();
    let mut remote = Vec::new();

    for raw in refs {
        match raw.parse() {
            Ok(CharacterRef::Local(id)) => local.push(id),
            Ok(CharacterRef::Remote(id)) => remote.push(id),
            Err(_) => {}
        }
    }

    (local, remote)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
