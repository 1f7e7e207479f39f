//! The per-entity record store.
//!
//! A `RecordStore<R>` owns the authoritative in-memory collection for one
//! entity. Every mutation rewrites the full collection to the backing
//! [`BlobStore`] and broadcasts a [`ChangeEvent`]. Write failures are
//! logged and swallowed, so the in-memory state keeps serving requests
//! even when persistence is unavailable.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use did_admin_core::RecordId;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::error::{Result, StoreError};
use crate::record::{ChangeEvent, ChangeKind, Record};
use crate::BlobStore;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// An in-memory collection of records mirrored to a blob store.
pub struct RecordStore<R: Record> {
    records: RwLock<Vec<R>>,
    blobs: Arc<dyn BlobStore>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl<R: Record> RecordStore<R> {
    /// Open the store, loading any previously persisted records.
    ///
    /// A missing blob yields an empty store. A blob that cannot be read or
    /// decoded is logged and also yields an empty store.
    pub fn open(blobs: Arc<dyn BlobStore>) -> Self {
        let records = match Self::load(blobs.as_ref()) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(key = R::STORAGE_KEY, error = %e, "Failed to load records, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(key = R::STORAGE_KEY, count = records.len(), "Record store opened");

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            records: RwLock::new(records),
            blobs,
            changes,
        }
    }

    fn load(blobs: &dyn BlobStore) -> Result<Vec<R>> {
        match blobs.load(R::STORAGE_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            None => Ok(Vec::new()),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of all records in store order.
    #[must_use]
    pub fn list(&self) -> Vec<R> {
        self.records.read().clone()
    }

    /// Find a record by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<R> {
        self.records
            .read()
            .iter()
            .find(|r| r.id().as_str() == id)
            .cloned()
    }

    /// Find the first record matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Option<R>
    where
        F: Fn(&R) -> bool,
    {
        self.records.read().iter().find(|r| predicate(r)).cloned()
    }

    /// All records matching a predicate, in store order.
    pub fn filter<F>(&self, predicate: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        self.records
            .read()
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a record under a freshly generated identifier.
    pub fn add(&self, mut record: R) -> R {
        record.set_id(RecordId::generate(R::ID_PREFIX));
        {
            let mut records = self.records.write();
            records.push(record.clone());
            self.persist_quietly(&records);
        }
        tracing::info!(key = R::STORAGE_KEY, id = %record.id(), "Record added");
        self.notify(ChangeKind::Added(1));
        record
    }

    /// Append a batch of records with one persistence write.
    pub fn add_many(&self, batch: Vec<R>) -> Vec<R> {
        if batch.is_empty() {
            return batch;
        }
        let added: Vec<R> = batch
            .into_iter()
            .map(|mut record| {
                record.set_id(RecordId::generate(R::ID_PREFIX));
                record
            })
            .collect();
        {
            let mut records = self.records.write();
            records.extend(added.iter().cloned());
            self.persist_quietly(&records);
        }
        tracing::info!(key = R::STORAGE_KEY, count = added.len(), "Records added");
        self.notify(ChangeKind::Added(added.len()));
        added
    }

    /// Merge a partial update into one record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has this identifier.
    pub fn update(&self, id: &str, patch: R::Patch) -> Result<R> {
        let updated = {
            let mut records = self.records.write();
            let record = records
                .iter_mut()
                .find(|r| r.id().as_str() == id)
                .ok_or_else(|| Self::not_found(id))?;
            record.apply_patch(patch, Utc::now());
            let updated = record.clone();
            self.persist_quietly(&records);
            updated
        };
        tracing::info!(key = R::STORAGE_KEY, id = %id, "Record updated");
        self.notify(ChangeKind::Updated(1));
        Ok(updated)
    }

    /// Merge the same partial update into every listed record.
    ///
    /// Unknown identifiers are skipped. Returns the number updated.
    pub fn update_many(&self, ids: &[String], patch: &R::Patch) -> usize {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let now = Utc::now();
        self.update_where(|record| {
            if wanted.contains(record.id().as_str()) {
                record.apply_patch(patch.clone(), now);
                true
            } else {
                false
            }
        })
    }

    /// Apply `f` to every record; `f` returns whether it changed the record.
    ///
    /// Persists and notifies once if anything changed. Returns the number
    /// of changed records.
    pub fn update_where<F>(&self, mut f: F) -> usize
    where
        F: FnMut(&mut R) -> bool,
    {
        let changed = {
            let mut records = self.records.write();
            let mut changed = 0;
            for record in records.iter_mut() {
                if f(record) {
                    changed += 1;
                }
            }
            if changed > 0 {
                self.persist_quietly(&records);
            }
            changed
        };
        if changed > 0 {
            tracing::info!(key = R::STORAGE_KEY, count = changed, "Records updated");
            self.notify(ChangeKind::Updated(changed));
        }
        changed
    }

    /// Remove one record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has this identifier.
    pub fn delete(&self, id: &str) -> Result<R> {
        let removed = {
            let mut records = self.records.write();
            let index = records
                .iter()
                .position(|r| r.id().as_str() == id)
                .ok_or_else(|| Self::not_found(id))?;
            let removed = records.remove(index);
            self.persist_quietly(&records);
            removed
        };
        tracing::info!(key = R::STORAGE_KEY, id = %id, "Record deleted");
        self.notify(ChangeKind::Deleted(1));
        Ok(removed)
    }

    /// Remove every listed record. Unknown identifiers are skipped.
    ///
    /// Returns the number removed.
    pub fn delete_many(&self, ids: &[String]) -> usize {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let removed = {
            let mut records = self.records.write();
            let before = records.len();
            records.retain(|r| !wanted.contains(r.id().as_str()));
            let removed = before - records.len();
            if removed > 0 {
                self.persist_quietly(&records);
            }
            removed
        };
        if removed > 0 {
            tracing::info!(key = R::STORAGE_KEY, count = removed, "Records deleted");
            self.notify(ChangeKind::Deleted(removed));
        }
        removed
    }

    /// Replace the whole collection, keeping the given identifiers.
    pub fn replace_all(&self, replacement: Vec<R>) -> usize {
        let count = replacement.len();
        {
            let mut records = self.records.write();
            *records = replacement;
            self.persist_quietly(&records);
        }
        tracing::info!(key = R::STORAGE_KEY, count, "Records replaced");
        self.notify(ChangeKind::Replaced(count));
        count
    }

    /// Remove every record.
    pub fn clear(&self) {
        self.replace_all(Vec::new());
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the current contents to the blob store.
    ///
    /// Unlike the implicit write after each mutation, failures are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn persist(&self) -> Result<()> {
        let records = self.records.read();
        self.write_blob(&records)
    }

    /// Discard in-memory state and reload from the blob store.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be read or decoded; the
    /// in-memory state is left untouched in that case.
    pub fn reload(&self) -> Result<usize> {
        let loaded = Self::load(self.blobs.as_ref())?;
        let count = loaded.len();
        *self.records.write() = loaded;
        tracing::info!(key = R::STORAGE_KEY, count, "Records reloaded");
        self.notify(ChangeKind::Replaced(count));
        Ok(count)
    }

    fn write_blob(&self, records: &[R]) -> Result<()> {
        let bytes =
            serde_json::to_vec(records).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.blobs.save(R::STORAGE_KEY, &bytes)
    }

    fn persist_quietly(&self, records: &[R]) {
        if let Err(e) = self.write_blob(records) {
            tracing::error!(key = R::STORAGE_KEY, error = %e, "Failed to persist records");
        }
    }

    fn notify(&self, kind: ChangeKind) {
        // No subscribers is fine.
        let _ = self.changes.send(ChangeEvent {
            entity: R::ENTITY,
            kind,
        });
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::NotFound {
            entity: R::ENTITY,
            id: RecordId::from(id.to_string()),
        }
    }
}
