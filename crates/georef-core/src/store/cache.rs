// ── Write-once reference cache ──
//
// Lock-sharded concurrent memo of children listings keyed by CacheKey.
// Entries are immutable shared slices: written once, never evicted,
// never mutated, dropped wholesale with the store.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{trace, warn};

use crate::error::CoreError;
use crate::model::{CacheKey, ReferenceNode};

/// Keyed memo of already-fetched children listings.
///
/// Shared by every resolver and section of one hierarchy type. Readers
/// get a cheap `Arc` clone of the stored slice, never a copy.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: DashMap<CacheKey, Arc<[ReferenceNode]>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the listing for `key`.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<[ReferenceNode]>> {
        self.entries.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Store the listing for `key`.
    ///
    /// Write-once: if an entry already exists the store is left untouched,
    /// the attempt is logged, and `DuplicateKeyWrite` is returned. The
    /// original entry wins.
    pub fn put(&self, key: CacheKey, nodes: Arc<[ReferenceNode]>) -> Result<(), CoreError> {
        match self.entries.entry(key) {
            Entry::Occupied(existing) => {
                warn!(key = %existing.key(), "ignoring second write to populated cache entry");
                Err(CoreError::DuplicateKeyWrite {
                    key: existing.key().to_string(),
                })
            }
            Entry::Vacant(slot) => {
                trace!(key = %slot.key(), count = nodes.len(), "cache entry written");
                slot.insert(nodes);
                Ok(())
            }
        }
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return every populated key.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }
}
