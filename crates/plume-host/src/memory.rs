//! Host-owned per-user memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryStoreError;

/// One entry in the host's memory store.
///
/// `created_at` only participates in ordering (oldest first) when entries
/// are scanned for a similarity match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Store interface: entries are created by insert and mutated by update.
/// The extensions never delete entries.
pub trait MemoryStore: Send + Sync {
    /// All entries belonging to a user, in no guaranteed order.
    fn entries_for_user(&self, user_id: &str) -> Result<Vec<MemoryEntry>, MemoryStoreError>;

    /// Insert a new entry and return it.
    fn insert(&self, user_id: &str, content: &str) -> Result<MemoryEntry, MemoryStoreError>;

    /// Replace the content of an existing entry.
    fn update(&self, entry_id: &str, content: &str) -> Result<(), MemoryStoreError>;
}
