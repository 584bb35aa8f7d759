//! Cache Module
//!
//! Provides the time-expiring byte cache and its building blocks.

mod entry;
mod stats;
mod store;
mod timed;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
pub use timed::TimedCache;
