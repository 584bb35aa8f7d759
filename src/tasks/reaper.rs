//! TTL Reaper Task
//!
//! Background task that periodically removes stale cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore};
use crate::config::MAX_DURATION;

/// Spawns the reaper for one cache.
///
/// Every `interval` the task takes the write lock and removes entries older
/// than `ttl`. The first pass runs one full interval after spawning. The task
/// ends when `shutdown` flips to `true` or its sender is dropped.
///
/// # Arguments
/// * `store` - shared store guarded by the cache's lock
/// * `stats` - counters updated after each pass
/// * `ttl` - maximum entry age
/// * `interval` - period between passes, must be non-zero; a first deadline
///   past `Instant` range is clamped to [`MAX_DURATION`] from now
/// * `shutdown` - stop signal from the owning cache
pub fn spawn_reaper_task(
    store: Arc<RwLock<CacheStore>>,
    stats: Arc<CacheStats>,
    ttl: Duration,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            ttl_ms = ttl.as_millis() as u64,
            interval_ms = interval.as_millis() as u64,
            "Starting TTL reaper task"
        );

        let now = Instant::now();
        let start = now
            .checked_add(interval)
            .unwrap_or_else(|| now + MAX_DURATION);
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let (removed, remaining) = {
                        let mut guard = store.write().await;
                        let removed = guard.sweep(ttl, Instant::now());
                        (removed, guard.len())
                    };
                    stats.record_sweep(removed);

                    if removed > 0 {
                        info!(removed, remaining, "TTL sweep removed stale entries");
                    } else {
                        debug!(remaining, "TTL sweep: no stale entries found");
                    }
                }
                changed = shutdown.changed() => {
                    // Err means the cache was dropped
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("TTL reaper task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn new_store() -> (Arc<RwLock<CacheStore>>, Arc<CacheStats>) {
        (
            Arc::new(RwLock::new(CacheStore::new())),
            Arc::new(CacheStats::new()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_removes_stale_entries() {
        let (store, stats) = new_store();
        store
            .write()
            .await
            .insert("expire_soon".to_string(), Bytes::from_static(b"value"));

        let (tx, rx) = watch::channel(false);
        let ttl = Duration::from_millis(100);
        let handle = spawn_reaper_task(store.clone(), stats.clone(), ttl, ttl, rx);

        // First tick at 100ms keeps the entry (age == ttl), second removes it
        time::sleep(Duration::from_millis(250)).await;

        assert_eq!(store.read().await.get("expire_soon"), None);
        assert_eq!(stats.snapshot(0).reclaimed, 1);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_preserves_fresh_entries() {
        let (store, stats) = new_store();
        let (tx, rx) = watch::channel(false);
        let handle = spawn_reaper_task(
            store.clone(),
            stats.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(1),
            rx,
        );

        store
            .write()
            .await
            .insert("long_lived".to_string(), Bytes::from_static(b"value"));

        time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(
            store.read().await.get("long_lived"),
            Some(Bytes::from_static(b"value"))
        );
        assert_eq!(stats.snapshot(0).sweeps, 3);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_reaper_stops_on_signal() {
        let (store, stats) = new_store();
        let (tx, rx) = watch::channel(false);
        let handle = spawn_reaper_task(
            store,
            stats,
            Duration::from_secs(1),
            Duration::from_secs(1),
            rx,
        );

        tx.send(true).unwrap();

        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn test_reaper_stops_when_sender_dropped() {
        let (store, stats) = new_store();
        let (tx, rx) = watch::channel(false);
        let handle = spawn_reaper_task(
            store,
            stats,
            Duration::from_secs(1),
            Duration::from_secs(1),
            rx,
        );

        drop(tx);

        time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reaper should stop once the cache is gone")
            .unwrap();
    }
}
