//! Expiration Sweep Task
//!
//! Background task that periodically reclaims dead entries. Reads only
//! reclaim the keys they touch, so without this pass expired keys that are
//! never read again would stay in memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically removes dead cache entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between runs
/// and taking the store's write lock for each pass. Entries still inside
/// their stale window are left alone.
///
/// # Returns
/// A JoinHandle for the spawned task, which is aborted at shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::from_config(&config)));
/// let sweep_handle = spawn_sweep_task(store.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut store_guard = store.write().await;
                store_guard.cleanup_expired()
            };

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
