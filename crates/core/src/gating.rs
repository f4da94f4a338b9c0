//! Age-gating policy.
//!
//! Every read path (listing, search, direct fetch, random picks, favorites
//! resolution) routes its visibility decision through this module so the
//! child-profile guarantee cannot drift between call sites.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Remote catalog ids divisible by this are treated as adult-only. The
/// remote catalog carries no age metadata of its own, so a fixed
/// deterministic slice of it stands in for age-restricted content.
pub const ADULT_REMOTE_ID_DIVISOR: i64 = 5;

/// Age restriction carried by every character view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeTag {
    All,
    Adult,
}

impl AgeTag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AgeTag::All => "all",
            AgeTag::Adult => "adult",
        }
    }

    /// Age tag of a remote catalog record, derived from its id.
    pub fn for_remote_id(id: i64) -> Self {
        if id % ADULT_REMOTE_ID_DIVISOR == 0 {
            AgeTag::Adult
        } else {
            AgeTag::All
        }
    }

    pub fn is_adult(&self) -> bool {
        matches!(self, AgeTag::Adult)
    }
}

impl TryFrom<String> for AgeTag {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "all" => Ok(AgeTag::All),
            "adult" => Ok(AgeTag::Adult),
            other => Err(CoreError::Validation(format!(
                "Invalid age restriction '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for AgeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile kind: adult profiles see everything, child profiles only
/// all-ages content. Serialized as the wire field `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Adult,
    Child,
}

impl ProfileKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Adult => "adult",
            ProfileKind::Child => "child",
        }
    }

    pub fn is_child(&self) -> bool {
        matches!(self, ProfileKind::Child)
    }

    /// Whether a profile of this kind may view content carrying `tag`.
    pub fn may_view(&self, tag: AgeTag) -> bool {
        !(self.is_child() && tag.is_adult())
    }
}

impl TryFrom<String> for ProfileKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "adult" => Ok(ProfileKind::Adult),
            "child" => Ok(ProfileKind::Child),
            other => Err(CoreError::Validation(format!(
                "Invalid profile type '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
