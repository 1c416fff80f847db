//! Cache Expiry Sweep
//!
//! Expired entries are already ignored on read; the sweep reclaims the ones
//! nobody reads again so they stop counting against capacity.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns a task that purges expired entries every `interval_secs` seconds.
///
/// The returned handle is aborted during shutdown.
pub fn spawn_cleanup_task(cache: MemoryCache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache expiry sweep with interval of {} seconds",
            interval.as_secs()
        );

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = MemoryCache::new(100, 300);
        cache.set("product_1", "{}".to_string(), 1).await.unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(cache.is_empty().await, "Expired entry should have been swept");
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = MemoryCache::new(100, 300);
        cache.set("all_products", "[]".to_string(), 3600).await.unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.get("all_products").await.unwrap().as_deref(), Some("[]"));
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(MemoryCache::new(10, 300), 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
