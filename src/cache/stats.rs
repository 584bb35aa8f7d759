//! Cache Statistics Module
//!
//! Tracks lookups, inserts and reaper activity with atomic counters so that
//! readers holding only the shared lock can still record hits and misses.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Live counters shared by the cache handle and the reaper.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    reclaimed: AtomicU64,
    sweeps: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Insert ==
    /// Increments the insert counter.
    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    // == Record Sweep ==
    /// Counts one reaper pass and the entries it removed.
    pub fn record_sweep(&self, removed: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.reclaimed.fetch_add(removed as u64, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters into a serializable snapshot.
    pub fn snapshot(&self, total_entries: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Calls to `add`, replacements included
    pub inserts: u64,
    /// Entries removed by the reaper
    pub reclaimed: u64,
    /// Completed reaper passes
    pub sweeps: u64,
    /// Entries in the store when the snapshot was taken
    pub total_entries: usize,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let snapshot = CacheStats::new().snapshot(0);
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.snapshot(0).hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.snapshot(0).hit_rate(), 0.75);
    }

    #[test]
    fn test_record_sweep() {
        let stats = CacheStats::new();
        stats.record_sweep(0);
        stats.record_sweep(3);

        let snapshot = stats.snapshot(7);
        assert_eq!(snapshot.sweeps, 2);
        assert_eq!(snapshot.reclaimed, 3);
        assert_eq!(snapshot.total_entries, 7);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = CacheStats::new();
        stats.record_insert();

        let json = serde_json::to_value(stats.snapshot(1)).unwrap();
        assert_eq!(json["inserts"], 1);
        assert_eq!(json["total_entries"], 1);
    }
}
