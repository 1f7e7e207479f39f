//! Common error types for did-admin.

use thiserror::Error;

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace only.
    #[error("identifier is empty")]
    Empty,

    /// The identifier contained a character that cannot appear in a URL path segment.
    #[error("identifier contains invalid character {0:?}")]
    InvalidCharacter(char),

    /// The identifier exceeded the maximum length.
    #[error("identifier too long: {got} > {max}")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        got: usize,
    },
}
