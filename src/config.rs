//! Configuration Module
//!
//! Construction parameters for a [`TimedCache`](crate::TimedCache).
//!
//! The crate reads no environment variables. Owners that keep their settings
//! in a file can embed a `CacheConfig` there; durations are written as integer
//! milliseconds (`ttl_ms`, `reap_interval_ms`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default TTL when none is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Longest accepted TTL or reap interval, roughly a century.
///
/// Keeps timer deadlines far from `Instant` overflow.
pub const MAX_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCacheConfig", into = "RawCacheConfig")]
pub struct CacheConfig {
    /// Maximum retention period for an entry
    pub ttl: Duration,
    /// Period of the reaper; `None` means the reaper ticks once per TTL
    pub reap_interval: Option<Duration>,
}

impl CacheConfig {
    /// Creates a config whose reaper interval equals the TTL.
    ///
    /// With a shared value an entry can outlive its TTL by up to one more
    /// sweep, so worst-case staleness is twice the TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            reap_interval: None,
        }
    }

    /// Sets a reaper interval independent of the TTL.
    pub fn with_reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = Some(interval);
        self
    }

    /// Returns the period the reaper actually runs at.
    pub fn effective_reap_interval(&self) -> Duration {
        self.reap_interval.unwrap_or(self.ttl)
    }

    /// Rejects durations the reaper or the serialized form cannot represent.
    ///
    /// Both durations must be non-zero (a zero-period timer would busy-loop),
    /// whole milliseconds, and no longer than [`MAX_DURATION`].
    pub fn validate(&self) -> Result<()> {
        check_duration("ttl", self.ttl)?;

        if let Some(interval) = self.reap_interval {
            check_duration("reap interval", interval)?;
        }

        Ok(())
    }
}

fn check_duration(name: &str, duration: Duration) -> Result<()> {
    if duration.is_zero() {
        return Err(CacheError::InvalidConfig(format!(
            "{} must be greater than zero",
            name
        )));
    }

    if duration.subsec_nanos() % 1_000_000 != 0 {
        return Err(CacheError::InvalidConfig(format!(
            "{} must be a whole number of milliseconds",
            name
        )));
    }

    if duration > MAX_DURATION {
        return Err(CacheError::InvalidConfig(format!(
            "{} must not exceed {} seconds",
            name,
            MAX_DURATION.as_secs()
        )));
    }

    Ok(())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

// == Serialized Form ==
#[derive(Serialize, Deserialize)]
struct RawCacheConfig {
    ttl_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reap_interval_ms: Option<u64>,
}

impl TryFrom<RawCacheConfig> for CacheConfig {
    type Error = CacheError;

    fn try_from(raw: RawCacheConfig) -> Result<Self> {
        let config = Self {
            ttl: Duration::from_millis(raw.ttl_ms),
            reap_interval: raw.reap_interval_ms.map(Duration::from_millis),
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<CacheConfig> for RawCacheConfig {
    fn from(config: CacheConfig) -> Self {
        Self {
            ttl_ms: duration_to_millis(config.ttl),
            reap_interval_ms: config.reap_interval.map(duration_to_millis),
        }
    }
}

// Validated configs never saturate
fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
