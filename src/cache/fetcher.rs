//! Fetcher Registry Module
//!
//! Type-erased fetchers remembered per key so a stale hit can refresh itself.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;

use crate::cache::SetOptions;

// == Fetcher ==
/// A no-argument async producer of a key's authoritative value, erased to JSON.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// Erases a typed fetcher into a [`Fetcher`].
pub fn erase<T, F, Fut>(fetcher: F) -> Fetcher
where
    T: Serialize + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetcher();
        async move {
            let value = fut.await?;
            anyhow::Ok(serde_json::to_value(value)?)
        }
        .boxed()
    })
}

// == Registered Fetcher ==
/// A fetcher plus the options its values are stored with.
#[derive(Clone)]
pub struct RegisteredFetcher {
    pub fetcher: Fetcher,
    pub options: SetOptions,
}

// == Fetcher Registry ==
/// Last fetcher used by `get_or_fetch` for each key.
///
/// Lives independently of the entries: deleting, evicting or invalidating a
/// key leaves its fetcher in place until another `get_or_fetch` overwrites it.
#[derive(Default)]
pub struct FetcherRegistry {
    fetchers: HashMap<String, RegisteredFetcher>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the fetcher for `key`.
    pub fn register(&mut self, key: impl Into<String>, fetcher: Fetcher, options: SetOptions) {
        self.fetchers
            .insert(key.into(), RegisteredFetcher { fetcher, options });
    }

    pub fn get(&self, key: &str) -> Option<RegisteredFetcher> {
        self.fetchers.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }

    pub fn clear(&mut self) {
        self.fetchers.clear();
    }
}

impl std::fmt::Debug for FetcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherRegistry")
            .field("keys", &self.fetchers.keys().collect::<Vec<_>>())
            .finish()
    }
}

// == Warm Item ==
/// One `{key, fetcher, options}` triple for [`CacheEngine::warm`](crate::cache::CacheEngine::warm).
#[derive(Clone)]
pub struct WarmItem {
    pub key: String,
    pub fetcher: Fetcher,
    pub options: SetOptions,
}

impl WarmItem {
    pub fn new<T, F, Fut>(key: impl Into<String>, fetcher: F, options: SetOptions) -> Self
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            key: key.into(),
            fetcher: erase(fetcher),
            options,
        }
    }
}

impl std::fmt::Debug for WarmItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarmItem")
            .field("key", &self.key)
            .field("options", &self.options)
            .finish()
    }
}
