//! Record stores and persistence for did-admin.
//!
//! Every entity (DIDs, area codes, companies, DialB entries) lives in its own
//! [`RecordStore`]: an in-memory collection that is the source of truth for
//! the running process, mirrored to a [`BlobStore`] after every mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   full JSON array    ┌─────────────────────┐
//! │   RecordStore<Did>   │ ───────────────────► │                     │
//! │   RecordStore<...>   │    (every mutation)  │   dyn BlobStore     │
//! └─────────┬────────────┘                      │  memory | rocksdb   │
//!           │ broadcast::Sender<ChangeEvent>    └─────────────────────┘
//!           ▼
//!      subscribers
//! ```
//!
//! There is no incremental diffing and no transaction log. A failed write
//! is logged and the in-memory state carries on.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use did_admin_store::{Company, MemoryBlobStore, RecordStore};
//!
//! let blobs = Arc::new(MemoryBlobStore::new());
//! let companies: RecordStore<Company> = RecordStore::open(blobs);
//! assert!(companies.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod record;
pub mod rocks;
pub mod schema;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryBlobStore;
pub use record::{ChangeEvent, ChangeKind, Entity, Record};
pub use rocks::RocksBlobStore;
pub use store::RecordStore;
pub use types::{
    AreaCode, AreaCodePatch, Company, CompanyPatch, DialBPatch, DialBRecord, DialBStatus, Did,
    DidPatch, DidStatus,
};

/// Key-value persistence for serialized record collections.
///
/// This trait abstracts the storage backend so the same record stores can
/// run purely in memory (tests, demos) or on `RocksDB`.
pub trait BlobStore: Send + Sync {
    /// Load the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn save(&self, key: &str, value: &[u8]) -> Result<()>;
}
