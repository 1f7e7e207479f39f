//! Database schema definitions and column families.
//!
//! Each record store persists its full contents as one JSON blob, so the
//! `RocksDB` layout is a single column family keyed by storage key
//! (`didsData`, `companiesData`, `areaCodesData`, `dialBData`).

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Serialized record collections, keyed by storage key.
    pub const BLOBS: &str = "blobs";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::BLOBS]
}
