//! Cache Engine Module
//!
//! Shared, cloneable handle over the entry store. Adds typed access,
//! read-through fetching, stale-while-revalidate refreshes, warming and the
//! background sweep lifecycle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::fetcher::{self, Fetcher, FetcherRegistry, WarmItem};
use crate::cache::{CacheStats, CacheStore, Lookup, SetOptions};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::spawn_sweep_task;

// == Cache Engine ==
/// One cache instance shared by every caller for the life of the process.
///
/// Cloning is cheap and yields another handle to the same cache. All store
/// mutations go through a single lock. Construct it once at startup and pass
/// it to whoever needs it; call [`shutdown`](Self::shutdown) at teardown.
#[derive(Clone)]
pub struct CacheEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    store: Arc<RwLock<CacheStore>>,
    fetchers: RwLock<FetcherRegistry>,
    sweep_interval: Duration,
    sweep: Mutex<Option<JoinHandle<()>>>,
}

impl CacheEngine {
    // == Constructor ==
    /// Wraps a store. The sweep is not started until [`start_sweep`](Self::start_sweep).
    pub fn new(store: CacheStore, sweep_interval: Duration) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store: Arc::new(RwLock::new(store)),
                fetchers: RwLock::new(FetcherRegistry::new()),
                sweep_interval,
                sweep: Mutex::new(None),
            }),
        }
    }

    /// Creates an engine from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheStore::from_config(config), config.sweep_interval())
    }

    // == Get ==
    /// Reads and deserializes a value.
    ///
    /// A stale hit returns the stale value and schedules a background refresh.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let value = self.get_value(key).await;
        Ok(value.map(serde_json::from_value).transpose()?)
    }

    /// Untyped [`get`](Self::get).
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        let lookup = self.inner.store.write().await.get(key);

        if let Lookup::Stale(_) = lookup {
            self.spawn_refresh(key.to_string());
        }

        lookup.into_value()
    }

    // == Set ==
    /// Serializes and stores a value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, options: SetOptions) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value, &options).await
    }

    /// Untyped [`set`](Self::set).
    pub async fn set_value(&self, key: &str, value: Value, options: &SetOptions) -> Result<()> {
        self.inner.store.write().await.set(key.to_string(), value, options)
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.store.write().await.delete(key)
    }

    // == Has ==
    /// Freshness-only check; an entry being served stale reports false.
    pub async fn has(&self, key: &str) -> bool {
        self.inner.store.read().await.has(key)
    }

    // == TTL ==
    /// Remaining fresh time, or None when the key is unknown.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        self.inner.store.read().await.ttl(key)
    }

    // == Touch ==
    pub async fn touch(&self, key: &str, extension: Duration) -> bool {
        self.inner.store.write().await.touch(key, extension)
    }

    // == Get Or Fetch ==
    /// Returns the cached value, or runs `fetcher`, stores its result and
    /// remembers `fetcher` for later stale refreshes.
    ///
    /// A fetcher failure is returned as [`CacheError::Fetch`](crate::error::CacheError::Fetch)
    /// and nothing is cached. Concurrent misses on one key each run the fetcher.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetcher: F, options: SetOptions) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let value = self
            .get_or_fetch_value(key, fetcher::erase(fetcher), options)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Untyped [`get_or_fetch`](Self::get_or_fetch).
    pub async fn get_or_fetch_value(&self, key: &str, fetcher: Fetcher, options: SetOptions) -> Result<Value> {
        let (value, _) = self.load(key, fetcher, options).await?;
        Ok(value)
    }

    /// Read-through load. The flag reports whether the value is held in the
    /// cache afterwards.
    async fn load(&self, key: &str, fetcher: Fetcher, options: SetOptions) -> Result<(Value, bool)> {
        if let Some(value) = self.get_value(key).await {
            return Ok((value, true));
        }

        let value = fetcher().await?;

        // The fetched value is returned even if it cannot be cached
        let cached = match self.set_value(key, value.clone(), &options).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Fetched value for '{}' was not cached: {}", key, e);
                false
            }
        };

        self.inner.fetchers.write().await.register(key, fetcher, options);

        Ok((value, cached))
    }

    // == Warm ==
    /// Runs `get_or_fetch` for every item concurrently. A failing item is
    /// logged and does not affect the others.
    ///
    /// Returns the number of items that are cached afterwards. An item whose
    /// value was fetched but rejected by the store is not counted.
    pub async fn warm(&self, items: Vec<WarmItem>) -> usize {
        let total = items.len();

        let results = join_all(items.into_iter().map(|item| async move {
            let result = self.load(&item.key, item.fetcher, item.options).await;
            (item.key, result)
        }))
        .await;

        let mut cached = 0;
        for (key, result) in results {
            match result {
                Ok((_, true)) => cached += 1,
                Ok((_, false)) => {}
                Err(e) => warn!("Cache warm failed for '{}': {}", key, e),
            }
        }

        info!("Cache warm complete: {}/{} keys cached", cached, total);
        cached
    }

    // == Batch ==
    /// [`get`](Self::get) for several keys, in order.
    pub async fn mget<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<Vec<Option<T>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// [`set`](Self::set) for several items. Not atomic: stops at the first
    /// failing item and keeps the ones already written.
    pub async fn mset<T: Serialize>(&self, items: Vec<(String, T, SetOptions)>) -> Result<()> {
        for (key, value, options) in items {
            self.set(&key, &value, options).await?;
        }
        Ok(())
    }

    // == Invalidation ==
    /// Deletes every key tagged `tag`. Returns how many were removed.
    pub async fn invalidate_by_tag(&self, tag: &str) -> usize {
        let removed = self.inner.store.write().await.invalidate_by_tag(tag);
        info!("Invalidated tag '{}': {} keys removed", tag, removed);
        removed
    }

    /// Deletes every key matching a `*` glob. Returns how many were removed.
    pub async fn invalidate_pattern(&self, glob: &str) -> usize {
        let removed = self.inner.store.write().await.invalidate_pattern(glob);
        info!("Invalidated pattern '{}': {} keys removed", glob, removed);
        removed
    }

    /// Empties the store and tag index. Cumulative counters survive.
    pub async fn clear(&self) {
        self.inner.store.write().await.clear();
        info!("Cache cleared");
    }

    // == Stats ==
    pub async fn get_stats(&self) -> CacheStats {
        self.inner.store.read().await.stats()
    }

    /// Number of keys with a remembered fetcher.
    pub async fn registered_fetchers(&self) -> usize {
        self.inner.fetchers.read().await.len()
    }

    // == Lifecycle ==
    /// Starts the periodic sweep. Calling it again while running is a no-op.
    pub async fn start_sweep(&self) {
        let mut sweep = self.inner.sweep.lock().await;
        if sweep.is_none() {
            *sweep = Some(spawn_sweep_task(
                Arc::clone(&self.inner.store),
                self.inner.sweep_interval,
            ));
        }
    }

    /// Stops the sweep, clears the store and forgets every fetcher.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.inner.sweep.lock().await.take() {
            handle.abort();
        }
        self.inner.store.write().await.clear();
        self.inner.fetchers.write().await.clear();
        info!("Cache engine shut down");
    }

    // == Stale Refresh ==
    fn spawn_refresh(&self, key: String) {
        let engine = self.clone();
        tokio::spawn(async move {
            engine.refresh(&key).await;
        });
    }

    /// Re-runs the registered fetcher for `key`. Failures are logged and dropped;
    /// the stale entry stays in place.
    async fn refresh(&self, key: &str) {
        let Some(registered) = self.inner.fetchers.read().await.get(key) else {
            debug!("No fetcher registered for '{}', serving stale value", key);
            return;
        };

        match (registered.fetcher)().await {
            Ok(value) => {
                let stored = self
                    .inner
                    .store
                    .write()
                    .await
                    .set(key.to_string(), value, &registered.options);
                match stored {
                    Ok(()) => debug!("Refreshed stale key '{}'", key),
                    Err(e) => warn!("Refreshed value for '{}' was not cached: {}", key, e),
                }
            }
            Err(e) => warn!("Background refresh of '{}' failed: {:#}", key, e),
        }
    }
}

impl std::fmt::Debug for CacheEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEngine")
            .field("sweep_interval", &self.inner.sweep_interval)
            .finish_non_exhaustive()
    }
}
