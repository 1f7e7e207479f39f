//! Error types for the import pipeline.

use thiserror::Error;

/// A result type using `ImportError`.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors raised while reading an uploaded CSV.
///
/// All of these are raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// No row in the scanned window looks like a header.
    #[error("could not identify header row in CSV file; ensure the file has proper column headers")]
    HeaderNotFound,

    /// Nothing but blank or footer rows follow the header.
    #[error("no valid data rows found in CSV file")]
    EmptyDataset,

    /// A fixed-template import is missing expected headers.
    #[error("invalid CSV format, missing headers: {}", missing.join(", "))]
    HeaderMismatch {
        /// Expected headers that were absent.
        missing: Vec<String>,
    },
}
