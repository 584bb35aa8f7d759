//! Timed Cache Module
//!
//! The public cache handle: shared storage behind a read/write lock plus the
//! reaper task that keeps it bounded in time.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::spawn_reaper_task;

// == Timed Cache ==
/// A concurrent byte cache whose entries are purged once older than the TTL.
///
/// Owners usually wrap it in an `Arc` and hand it to whichever component
/// needs it. Dropping the cache stops its reaper.
///
/// # Example
/// ```no_run
/// # async fn demo() -> timed_cache::Result<()> {
/// use std::time::Duration;
/// use timed_cache::TimedCache;
///
/// let cache = TimedCache::new(Duration::from_secs(60))?;
/// cache.add("https://example.org/api/location?offset=0", vec![1u8, 2, 3]).await;
/// assert!(cache.get("https://example.org/api/location?offset=0").await.is_some());
/// cache.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TimedCache {
    store: Arc<RwLock<CacheStore>>,
    stats: Arc<CacheStats>,
    config: CacheConfig,
    shutdown_tx: watch::Sender<bool>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl TimedCache {
    // == Constructors ==
    /// Creates a cache whose TTL is also its sweep interval.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(ttl: Duration) -> Result<Self> {
        Self::with_config(CacheConfig::new(ttl))
    }

    /// Creates a cache from a validated config and starts its reaper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(RwLock::new(CacheStore::new()));
        let stats = Arc::new(CacheStats::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = spawn_reaper_task(
            store.clone(),
            stats.clone(),
            config.ttl,
            config.effective_reap_interval(),
            shutdown_rx,
        );
        debug!(?config, "Timed cache created");

        Ok(Self {
            store,
            stats,
            config,
            shutdown_tx,
            reaper: Mutex::new(Some(handle)),
        })
    }

    // == Add ==
    /// Inserts or replaces the entry for `key`, stamped with the current instant.
    pub async fn add(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        let key = key.into();
        let value = value.into();

        let replaced = self.store.write().await.insert(key, value);
        self.stats.record_insert();

        if replaced {
            debug!("Replaced existing cache entry");
        }
    }

    // == Get ==
    /// Returns the value stored for `key`, or `None` on a miss.
    ///
    /// An empty payload is a hit (`Some` of an empty buffer).
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        let value = self.store.read().await.get(key);

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Get Or Fetch ==
    /// Returns the cached value for `key`, or runs `fetch` and caches its result.
    ///
    /// No lock is held while `fetch` runs, so two concurrent misses may both
    /// fetch; the later insert wins. A fetch error is returned as-is and
    /// nothing is stored.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
    ) -> std::result::Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Bytes, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = fetch().await?;
        self.add(key, value.clone()).await;
        Ok(value)
    }

    // == Introspection ==
    /// Returns the number of entries currently stored.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == TTL ==
    /// Returns the configured maximum entry age.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    // == Reap Interval ==
    /// Returns the period between reaper passes.
    pub fn reap_interval(&self) -> Duration {
        self.config.effective_reap_interval()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> StatsSnapshot {
        let total_entries = self.len().await;
        self.stats.snapshot(total_entries)
    }

    // == Shutdown ==
    /// Stops the reaper and waits for it to exit. Safe to call more than once,
    /// including concurrently; every caller returns only once the reaper is gone.
    ///
    /// `add` and `get` keep working afterwards, but nothing is reclaimed.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);

        let handle = match self.reaper.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match handle {
            Some(handle) => {
                if let Err(err) = handle.await {
                    warn!(error = %err, "TTL reaper task ended abnormally");
                }
                info!("Timed cache shut down");
            }
            // Another caller owns the handle; the reaper's receiver drops when it exits
            None => self.shutdown_tx.closed().await,
        }
    }

    // == Is Reaper Running ==
    /// Returns true while the reaper task is alive.
    pub fn is_reaper_running(&self) -> bool {
        !self.shutdown_tx.is_closed()
    }
}
