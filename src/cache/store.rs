//! Cache Store Module
//!
//! HashMap storage for entries plus the sweep routine run by the reaper.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use crate::cache::CacheEntry;

// == Cache Store ==
/// Key to entry mapping. Callers provide the locking.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Returns `true` when an older entry was replaced.
    pub fn insert(&mut self, key: String, value: Bytes) -> bool {
        self.entries.insert(key, CacheEntry::new(value)).is_some()
    }

    // == Get ==
    /// Returns the stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Sweep ==
    /// Removes every entry older than `ttl` at `now`.
    ///
    /// Stale keys are collected before any removal, so each key is examined
    /// exactly once. Returns the number of entries removed.
    pub fn sweep(&mut self, ttl: Duration, now: Instant) -> usize {
        let stale_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_stale(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale_keys {
            self.entries.remove(key);
        }

        stale_keys.len()
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
