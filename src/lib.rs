//! Timed Cache - A concurrent in-memory byte cache with TTL reaping
//!
//! Memoizes fetched payloads by request key and purges them in the
//! background once they outlive the configured time-to-live.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{StatsSnapshot, TimedCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
