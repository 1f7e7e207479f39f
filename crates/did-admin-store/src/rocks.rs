//! `RocksDB` blob storage implementation.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};

use crate::error::{Result, StoreError};
use crate::schema::{all_column_families, cf};
use crate::BlobStore;

/// RocksDB-backed blob storage.
pub struct RocksBlobStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksBlobStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }
}

impl BlobStore for RocksBlobStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf::BLOBS)?;
        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self.cf(cf::BLOBS)?;
        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Company, CompanyPatch};
    use crate::RecordStore;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksBlobStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksBlobStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn blob_roundtrip() {
        let (store, _dir) = create_test_store();
        assert!(store.load("companiesData").unwrap().is_none());

        store.save("companiesData", b"[]").unwrap();
        assert_eq!(store.load("companiesData").unwrap().unwrap(), b"[]");
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();

        let id = {
            let blobs = Arc::new(RocksBlobStore::open(dir.path()).unwrap());
            let companies: RecordStore<Company> = RecordStore::open(blobs);
            let added = companies.add(Company::new("ACME", "Acme Corp", ""));
            companies
                .update(
                    added.id.as_str(),
                    CompanyPatch {
                        description: Some("Anvils".to_string()),
                        ..CompanyPatch::default()
                    },
                )
                .unwrap();
            added.id
        };

        let blobs = Arc::new(RocksBlobStore::open(dir.path()).unwrap());
        let companies: RecordStore<Company> = RecordStore::open(blobs);
        let reloaded = companies.get(id.as_str()).unwrap();
        assert_eq!(reloaded.code, "ACME");
        assert_eq!(reloaded.description, "Anvils");
    }
}
