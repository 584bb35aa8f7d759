//! Cache Entry Module
//!
//! Defines the immutable (value, creation instant) pair stored per key.

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

// == Cache Entry ==
/// A single cache entry. Never mutated; replacing a key builds a new entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Bytes,
    /// Instant the entry was inserted
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed between insertion and `now`, zero if `now` is earlier.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Stale ==
    /// Checks whether the entry has outlived `ttl` at `now`.
    ///
    /// The comparison is strict: an entry whose age equals the TTL is kept
    /// until the next sweep.
    pub fn is_stale(&self, ttl: Duration, now: Instant) -> bool {
        self.age(now) > ttl
    }
}
