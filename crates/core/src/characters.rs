//! Character vocabulary shared by stored rows and remote catalog records.
//!
//! The string forms mirror the remote catalog's casing exactly
//! (`"Alive"`, `"unknown"`, `"Genderless"`) so local and remote records
//! serialize identically.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Image used for custom characters created without one.
pub const DEFAULT_CHARACTER_IMAGE: &str =
    "https://rickandmortyapi.com/api/character/avatar/19.jpeg";

/// Placeholder for origin/location names left blank at creation.
pub const DEFAULT_PLACE_NAME: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterStatus {
    Alive,
    Dead,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CharacterStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CharacterStatus::Alive => "Alive",
            CharacterStatus::Dead => "Dead",
            CharacterStatus::Unknown => "unknown",
        }
    }
}

impl Default for CharacterStatus {
    fn default() -> Self {
        CharacterStatus::Alive
    }
}

impl TryFrom<String> for CharacterStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Alive" => Ok(CharacterStatus::Alive),
            "Dead" => Ok(CharacterStatus::Dead),
            "unknown" => Ok(CharacterStatus::Unknown),
            other => Err(CoreError::Validation(format!(
                "Invalid character status '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Genderless,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Genderless => "Genderless",
            Gender::Unknown => "unknown",
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unknown
    }
}

impl TryFrom<String> for Gender {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Genderless" => Ok(Gender::Genderless),
            "unknown" => Ok(Gender::Unknown),
            other => Err(CoreError::Validation(format!("Invalid gender '{other}'"))),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
