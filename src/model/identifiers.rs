//! Identifier newtypes with smart constructors.
//!
//! Both identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of credential characters shown in diagnostics.
const CREDENTIAL_VISIBLE_PREFIX: usize = 6;

/// Opaque provider identifier for a place (e.g. Google `place_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    /// Smart constructor: rejects empty and whitespace-only ids.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidPlaceId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Err(InvalidPlaceId::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlaceId {
    type Error = InvalidPlaceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PlaceId> for String {
    fn from(id: PlaceId) -> Self {
        id.0
    }
}

/// Access credential for a places provider.
///
/// `Debug` and `Display` never print the full secret; see [`Credential::redacted`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    /// Smart constructor: rejects empty and whitespace-only credentials.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidCredential> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(InvalidCredential::Empty)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Build from an optional raw value, treating `None` like an empty string.
    pub fn from_optional(raw: Option<&str>) -> Result<Self, InvalidCredential> {
        Self::new(raw.unwrap_or_default())
    }

    /// The secret itself, for building provider requests.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First few characters followed by an ellipsis.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(CREDENTIAL_VISIBLE_PREFIX).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

// ===== Error Types =====

/// Rejected place identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPlaceId {
    /// Identifier was empty.
    #[error("Place ID cannot be empty")]
    Empty,
}

/// Rejected provider credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCredential {
    /// Credential was missing or empty.
    #[error("Provider credential cannot be empty")]
    Empty,
}

// ===== Tests =====
