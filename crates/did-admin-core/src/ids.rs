//! Record identifier type for did-admin.
//!
//! Every persisted record (DID, area code, company, DialB entry) carries an
//! opaque string identifier. Generated identifiers are `<prefix>-<uuid>`,
//! but records loaded from older persisted state may carry any non-empty
//! string (`"1"`, `"test-did-1"`), so the type does not assume a format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IdError;

/// Maximum accepted identifier length.
pub const MAX_ID_LEN: usize = 128;

/// An opaque record identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new unique identifier with the given prefix.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Parse an identifier supplied by a caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty, too long, or contains
    /// whitespace, `/` or `?`.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.trim().is_empty() {
            return Err(IdError::Empty);
        }
        if s.len() > MAX_ID_LEN {
            return Err(IdError::TooLong {
                max: MAX_ID_LEN,
                got: s.len(),
            });
        }
        if let Some(c) = s.chars().find(|c| c.is_whitespace() || *c == '/' || *c == '?') {
            return Err(IdError::InvalidCharacter(c));
        }
        Ok(Self(s.to_string()))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
