//! The record abstraction shared by every entity store.

use std::fmt;

use chrono::{DateTime, Utc};
use did_admin_core::RecordId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The kinds of records the application keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Entity {
    /// Direct Inward Dial phone numbers.
    Did,
    /// Area code to state/timezone lookup entries.
    AreaCode,
    /// Companies that own DIDs.
    Company,
    /// DialB spam/clean flags.
    DialB,
}

impl Entity {
    /// Human-readable label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Did => "DID",
            Self::AreaCode => "area code",
            Self::Company => "company",
            Self::DialB => "DialB record",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happened to a record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "count")]
pub enum ChangeKind {
    /// Records were appended.
    Added(usize),
    /// Records were modified in place.
    Updated(usize),
    /// Records were removed.
    Deleted(usize),
    /// The whole collection was replaced (bulk load, clear, reload).
    Replaced(usize),
}

/// Notification emitted after every store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The store that changed.
    pub entity: Entity,
    /// The kind of change.
    pub kind: ChangeKind,
}

/// A record that can live in a [`RecordStore`](crate::RecordStore).
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key under which the collection is persisted.
    const STORAGE_KEY: &'static str;

    /// Prefix for generated identifiers.
    const ID_PREFIX: &'static str;

    /// Which entity this record represents.
    const ENTITY: Entity;

    /// Partial update merged by [`Record::apply_patch`].
    type Patch: Clone + Send + Sync;

    /// The record's identifier.
    fn id(&self) -> &RecordId;

    /// Replace the record's identifier.
    fn set_id(&mut self, id: RecordId);

    /// Merge a partial update and stamp the last-modified time.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);
}
