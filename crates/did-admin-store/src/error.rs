//! Error types for the storage layer.

use did_admin_core::RecordId;
use thiserror::Error;

use crate::record::Entity;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Which record store was queried.
        entity: Entity,
        /// The missing identifier.
        id: RecordId,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
