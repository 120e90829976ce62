//! PSN profile identifiers
//!
//! A `ProfileId` is the online ID shown in the URL of a PSNProfiles page. It is
//! validated once on construction so the rest of the crate can use it as a URL
//! path segment and as a cache file name without further escaping.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Longest online ID PSN allows
const MAX_ID_LEN: usize = 16;

/// Errors produced when validating a profile identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or only whitespace
    #[error("Profile name must not be empty")]
    Empty,

    /// The identifier exceeds the PSN length limit
    #[error("Profile name '{0}' is longer than 16 characters")]
    TooLong(String),

    /// The identifier contains characters PSN never allows
    #[error("Profile name '{0}' may only contain letters, digits, '-' and '_'")]
    InvalidChars(String),
}

/// A validated PSN online ID
///
/// The original spelling is kept for URLs and display. PSNProfiles resolves IDs
/// case-insensitively, so `cache_key` folds to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileId(String);

impl ProfileId {
    /// Validates and wraps an online ID
    ///
    /// Surrounding whitespace is trimmed before validation.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(IdError::Empty);
        }
        if id.chars().count() > MAX_ID_LEN {
            return Err(IdError::TooLong(id.to_string()));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(IdError::InvalidChars(id.to_string()));
        }
        Ok(Self(id.to_string()))
    }

    /// The ID as the user typed it
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used by the cache store
    pub fn cache_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProfileId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProfileId> for String {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ProfileId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
