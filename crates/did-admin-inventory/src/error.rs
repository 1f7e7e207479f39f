//! Error types for the inventory service.
//!
//! Every failure maps onto one of the categories the HTTP layer reports:
//! validation (400), missing record (404), duplicate business key (409),
//! unreadable upload (400, nothing written) and internal (500).

use did_admin_core::RecordId;
use did_admin_import::ImportError;
use did_admin_store::{Entity, StoreError};
use thiserror::Error;

/// A result type using `InventoryError`.
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors that can occur in inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The requested record was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The record kind.
        entity: Entity,
        /// The identifier that was looked up.
        id: RecordId,
    },

    /// A required field was missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A business key is already in use.
    #[error("{0}")]
    Conflict(String),

    /// An uploaded CSV could not be read.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl InventoryError {
    /// Shorthand for a missing record.
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: RecordId::from(id.into()),
        }
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) | Self::Import(_) => 400,
            Self::Conflict(_) => 409,
            Self::Store(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<StoreError> for InventoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            InventoryError::not_found(Entity::Did, "did-1").http_status_code(),
            404
        );
        assert_eq!(
            InventoryError::Validation("didNumber is required".into()).http_status_code(),
            400
        );
        assert_eq!(
            InventoryError::Conflict("code taken".into()).http_status_code(),
            409
        );
        assert_eq!(
            InventoryError::from(ImportError::EmptyDataset).http_status_code(),
            400
        );
        assert_eq!(
            InventoryError::Internal("boom".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn store_not_found_stays_not_found() {
        let err = InventoryError::from(StoreError::NotFound {
            entity: Entity::Company,
            id: RecordId::from("c-1".to_string()),
        });
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.to_string(), "company not found: c-1");

        let err = InventoryError::from(StoreError::Database("disk".into()));
        assert_eq!(err.http_status_code(), 500);
    }
}
