//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ResolutionCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Lookups already drop expired entries lazily; the sweep reclaims space
/// held by keys that are never requested again, such as one-off tombstones.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(ResolutionCache::new(1000));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(5));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<ResolutionCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();

            if removed > 0 {
                let stats = cache.stats();
                info!(
                    "TTL cleanup: removed {} expired entries ({} remaining, hit rate {:.2})",
                    removed,
                    stats.total_entries,
                    stats.hit_rate()
                );
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ShortKey;

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = Arc::new(ResolutionCache::new(100));
        cache.put_tombstone(ShortKey::new("expire_soon").unwrap(), Duration::from_secs(1));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(cache.is_empty(), "Expired entry should have been cleaned up");
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = Arc::new(ResolutionCache::new(100));
        cache.put_tombstone(ShortKey::new("long_lived").unwrap(), Duration::from_secs(3600));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.len(), 1, "Valid entry should not be removed");
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = Arc::new(ResolutionCache::new(100));

        let handle = spawn_cleanup_task(cache, Duration::from_secs(1));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
