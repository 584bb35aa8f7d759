//! Background Tasks Module
//!
//! Contains background tasks that run for the life of a cache.
//!
//! # Tasks
//! - TTL Reaper: Removes stale cache entries at the configured interval

mod reaper;

pub use reaper::spawn_reaper_task;
