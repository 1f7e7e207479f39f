//! In-memory blob storage.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::BlobStore;

/// A `BlobStore` that keeps everything in process memory.
///
/// Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        self.blobs.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let store = MemoryBlobStore::new();
        assert!(store.load("didsData").unwrap().is_none());

        store.save("didsData", b"[]").unwrap();
        assert_eq!(store.load("didsData").unwrap().unwrap(), b"[]");

        store.save("didsData", b"[1]").unwrap();
        assert_eq!(store.load("didsData").unwrap().unwrap(), b"[1]");
    }
}
