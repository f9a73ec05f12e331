//! Cache Store Module
//!
//! Entry store combining HashMap storage with the eviction policy, the tag
//! index and TTL / stale-window expiration. Synchronous; the engine wraps it
//! in a lock.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EntryState, EvictionPolicy, KeyPattern, SetOptions, TagIndex};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Lookup ==
/// Outcome of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Hit on a fresh entry
    Fresh(Value),
    /// Hit on an entry inside its stale window; the caller should refresh it
    Stale(Value),
    /// Absent, or expired and now removed
    Miss,
}

impl Lookup {
    /// The value, if this was a hit.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Fresh(value) | Lookup::Stale(value) => Some(value),
            Lookup::Miss => None,
        }
    }
}

// == Cache Store ==
/// Main cache storage with bounded eviction and TTL support.
///
/// `total_size` always equals the sum of the entries' `size` fields; it is
/// maintained on every insert and removal, never recomputed.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Tag to keys index
    tags: TagIndex,
    /// Victim selection
    policy: EvictionPolicy,
    /// Performance statistics
    stats: CacheStats,
    /// Running sum of entry sizes
    total_size: usize,
    /// Size ceiling in bytes
    max_size: usize,
    /// Entry count ceiling
    max_items: usize,
    /// TTL for writes that do not set one
    default_ttl: Duration,
    /// Stale window for writes that do not set one
    default_stale_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given ceilings and defaults.
    ///
    /// # Arguments
    /// * `max_size` - Ceiling on summed estimated entry size, in bytes
    /// * `max_items` - Ceiling on the number of entries
    /// * `default_ttl` - TTL for writes without an explicit one
    /// * `default_stale_ttl` - Stale window for writes without an explicit one
    pub fn new(max_size: usize, max_items: usize, default_ttl: Duration, default_stale_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            tags: TagIndex::new(),
            policy: EvictionPolicy::new(),
            stats: CacheStats::new(),
            total_size: 0,
            max_size,
            max_items,
            default_ttl,
            default_stale_ttl,
        }
    }

    /// Creates a CacheStore from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_size,
            config.max_items,
            config.default_ttl(),
            config.default_stale_ttl(),
        )
    }

    // == Get ==
    /// Reads a key.
    ///
    /// Fresh and stale entries count as hits and update access tracking.
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Lookup {
        let now = Instant::now();

        let state = match self.entries.get(key) {
            Some(entry) => entry.state(now),
            None => {
                self.stats.record_miss();
                return Lookup::Miss;
            }
        };

        if state == EntryState::Expired {
            debug!("Key '{}' expired, removing on read", key);
            self.delete(key);
            self.stats.record_miss();
            return Lookup::Miss;
        }

        let Some(entry) = self.entries.get_mut(key) else {
            return Lookup::Miss;
        };
        entry.record_access(now);
        let value = entry.value.clone();
        self.stats.record_hit();

        match state {
            EntryState::Fresh => Lookup::Fresh(value),
            _ => Lookup::Stale(value),
        }
    }

    // == Set ==
    /// Stores a value, evicting lowest-score entries until it fits.
    ///
    /// Replacing a key detaches the old entry (size and tags) before eviction
    /// runs, so the key being written is never its own victim. Fails without
    /// touching the store if the value alone exceeds `max_size`.
    pub fn set(&mut self, key: String, value: Value, options: &SetOptions) -> Result<()> {
        if self.max_items == 0 {
            return Err(CacheError::CacheFull(
                "Cache is configured to hold no entries".to_string(),
            ));
        }

        let mut tags = options.tags.clone();
        tags.sort();
        tags.dedup();

        let entry = CacheEntry::new(
            value,
            options.ttl.unwrap_or(self.default_ttl),
            options.stale_ttl.unwrap_or(self.default_stale_ttl),
            tags,
            Instant::now(),
        );

        if entry.size > self.max_size {
            return Err(CacheError::EntryTooLarge {
                size: entry.size,
                max_size: self.max_size,
            });
        }

        self.detach(&key);
        self.make_room(entry.size);

        self.total_size += entry.size;
        self.tags.register(&key, &entry.tags);
        self.entries.insert(key, entry);
        self.stats.record_set();

        Ok(())
    }

    // == Delete ==
    /// Removes an entry and its tag memberships. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.detach(key).is_some() {
            self.stats.record_delete();
            true
        } else {
            false
        }
    }

    // == Has ==
    /// Freshness-only existence check. Stale entries report false; no stats change.
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.get(key).is_some_and(|entry| entry.is_fresh(now))
    }

    // == TTL ==
    /// Remaining fresh time, or None if the key is unknown.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries.get(key).map(|entry| entry.ttl_remaining(now))
    }

    // == Touch ==
    /// Sets `expires_at = now + extension` without changing the value.
    ///
    /// Returns false if the key is absent or already past its stale window.
    pub fn touch(&mut self, key: &str, extension: Duration) -> bool {
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(entry) if entry.state(now) != EntryState::Expired => {
                entry.touch(extension, now);
                true
            }
            _ => false,
        }
    }

    // == Invalidate By Tag ==
    /// Deletes every key registered under `tag` and drops the tag.
    pub fn invalidate_by_tag(&mut self, tag: &str) -> usize {
        let keys = self.tags.take(tag);
        keys.iter().filter(|key| self.delete(key)).count()
    }

    // == Invalidate Pattern ==
    /// Deletes every key matching a `*` glob. O(n) over the current keys.
    pub fn invalidate_pattern(&mut self, glob: &str) -> usize {
        let pattern = KeyPattern::new(glob);
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.matches(key))
            .cloned()
            .collect();

        keys.iter().filter(|key| self.delete(key)).count()
    }

    // == Clear ==
    /// Empties the store and the tag index. Cumulative counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.tags.clear();
        self.total_size = 0;
    }

    // == Cleanup Expired ==
    /// Removes every entry past both its TTL and its stale window.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.state(now) == EntryState::Expired)
            .map(|(key, _)| key.clone())
            .collect();

        expired_keys.iter().filter(|key| self.delete(key)).count()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.total_size, self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Running total of estimated entry sizes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &HashMap<String, CacheEntry> {
        &self.entries
    }

    #[cfg(test)]
    pub(crate) fn tag_index(&self) -> &TagIndex {
        &self.tags
    }

    // == Internal ==
    /// Removes an entry with size and tag bookkeeping, without touching counters.
    fn detach(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_size -= entry.size;
        self.tags.unregister(key, &entry.tags);
        Some(entry)
    }

    /// Evicts until an entry of `incoming` bytes fits under both ceilings.
    fn make_room(&mut self, incoming: usize) {
        while self.total_size + incoming > self.max_size || self.entries.len() >= self.max_items {
            let Some(victim) = self.policy.select_victim(&self.entries) else {
                break;
            };
            self.detach(&victim);
            self.stats.record_eviction();
            debug!("Evicted '{}' to make room for {} bytes", victim, incoming);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{estimate_size, MAX_LIFETIME};
    use serde_json::json;
    use tokio::time::advance;

    fn store() -> CacheStore {
        CacheStore::new(1024 * 1024, 100, Duration::from_secs(300), Duration::ZERO)
    }

    fn ttl(secs: u64) -> SetOptions {
        SetOptions::new().ttl(Duration::from_secs(secs))
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_set_and_get() {
        let mut store = store();

        store.set("key1".to_string(), json!("value1"), &SetOptions::new()).unwrap();

        assert_eq!(store.get("key1"), Lookup::Fresh(json!("value1")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().hits, 1);
        assert_eq!(store.stats().sets, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_get_nonexistent() {
        let mut store = store();

        assert_eq!(store.get("nonexistent"), Lookup::Miss);
        assert_eq!(store.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_delete() {
        let mut store = store();

        store.set("key1".to_string(), json!("value1"), &SetOptions::new()).unwrap();
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.total_size(), 0);
        assert_eq!(store.get("key1"), Lookup::Miss);
        assert_eq!(store.stats().deletes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_delete_nonexistent() {
        let mut store = store();

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.stats().deletes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_overwrite_replaces_size() {
        let mut store = store();

        store.set("key1".to_string(), json!("short"), &SetOptions::new()).unwrap();
        store
            .set("key1".to_string(), json!("a much longer value"), &SetOptions::new())
            .unwrap();

        assert_eq!(store.get("key1"), Lookup::Fresh(json!("a much longer value")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_size(), estimate_size(&json!("a much longer value")));
        assert_eq!(store.stats().deletes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_expiration() {
        let mut store = store();

        store
            .set("key1".to_string(), json!("value1"), &ttl(10).stale_ttl(Duration::ZERO))
            .unwrap();
        assert!(store.has("key1"));

        advance(Duration::from_secs(11)).await;

        assert_eq!(store.get("key1"), Lookup::Miss);
        assert!(!store.has("key1"));
        assert_eq!(store.total_size(), 0);
        assert_eq!(store.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_stale_window() {
        let mut store = store();

        store
            .set("key1".to_string(), json!("v1"), &ttl(10).stale_ttl(Duration::from_secs(20)))
            .unwrap();

        advance(Duration::from_secs(15)).await;
        assert_eq!(store.get("key1"), Lookup::Stale(json!("v1")));
        // has() only looks at freshness
        assert!(!store.has("key1"));

        advance(Duration::from_secs(15)).await;
        assert_eq!(store.get("key1"), Lookup::Stale(json!("v1")));

        advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("key1"), Lookup::Miss);
        assert_eq!(store.stats().hits, 2);
        assert_eq!(store.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_default_stale_ttl_applies() {
        let mut store = CacheStore::new(1024, 10, Duration::from_secs(10), Duration::from_secs(5));

        store.set("k".to_string(), json!(1), &SetOptions::new()).unwrap();
        advance(Duration::from_secs(12)).await;

        assert_eq!(store.get("k"), Lookup::Stale(json!(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_eviction_by_item_count() {
        let mut store = CacheStore::new(1024 * 1024, 3, Duration::from_secs(300), Duration::ZERO);

        for key in ["key1", "key2", "key3"] {
            store.set(key.to_string(), json!(key), &SetOptions::new()).unwrap();
            advance(Duration::from_millis(10)).await;
        }

        // key1 is oldest and never read
        store.set("key4".to_string(), json!("key4"), &SetOptions::new()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 1);
        assert!(!store.has("key1"));
        assert!(store.has("key2"));
        assert!(store.has("key4"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_eviction_spares_frequently_read() {
        let mut store = CacheStore::new(1024 * 1024, 3, Duration::from_secs(300), Duration::ZERO);

        for key in ["key1", "key2", "key3"] {
            store.set(key.to_string(), json!(key), &SetOptions::new()).unwrap();
            advance(Duration::from_millis(10)).await;
        }
        store.get("key1");

        store.set("key4".to_string(), json!("key4"), &SetOptions::new()).unwrap();

        assert!(store.has("key1"));
        assert!(!store.has("key2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_eviction_by_size() {
        let item = json!("0123456789");
        let item_size = estimate_size(&item);
        let mut store = CacheStore::new(item_size * 3, 100, Duration::from_secs(300), Duration::ZERO);

        for i in 0..10 {
            store.set(format!("key{i}"), item.clone(), &SetOptions::new()).unwrap();
            assert!(store.total_size() <= store.max_size());
            advance(Duration::from_millis(5)).await;
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 7);
        assert!(store.has("key9"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_overwrite_never_evicts_itself() {
        let mut store = CacheStore::new(1024 * 1024, 1, Duration::from_secs(300), Duration::ZERO);

        store.set("only".to_string(), json!(1), &SetOptions::new()).unwrap();
        store.set("only".to_string(), json!(2), &SetOptions::new()).unwrap();

        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("only"), Lookup::Fresh(json!(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_rejects_entry_larger_than_max_size() {
        let mut store = CacheStore::new(16, 10, Duration::from_secs(300), Duration::ZERO);
        store.set("small".to_string(), json!(1), &SetOptions::new()).unwrap();

        let result = store.set("huge".to_string(), json!("x".repeat(100)), &SetOptions::new());

        assert!(matches!(result, Err(CacheError::EntryTooLarge { .. })));
        assert!(store.has("small"), "Rejected write must not evict anything");
        assert_eq!(store.stats().evictions, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_zero_capacity() {
        let mut store = CacheStore::new(1024, 0, Duration::from_secs(300), Duration::ZERO);

        let result = store.set("k".to_string(), json!(1), &SetOptions::new());
        assert!(matches!(result, Err(CacheError::CacheFull(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_and_touch() {
        let mut store = store();
        store.set("k".to_string(), json!("v"), &ttl(10)).unwrap();

        assert_eq!(store.ttl("k"), Some(Duration::from_secs(10)));
        assert_eq!(store.ttl("missing"), None);

        advance(Duration::from_secs(5)).await;
        assert!(store.touch("k", Duration::from_secs(20)));
        assert!(!store.touch("missing", Duration::from_secs(20)));

        advance(Duration::from_secs(15)).await;
        assert_eq!(store.get("k"), Lookup::Fresh(json!("v")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_invalidate_by_tag() {
        let mut store = store();
        store.set("a".to_string(), json!(1), &SetOptions::new().tag("x")).unwrap();
        store.set("b".to_string(), json!(2), &SetOptions::new().tag("x").tag("z")).unwrap();
        store.set("c".to_string(), json!(3), &SetOptions::new().tag("y")).unwrap();

        assert_eq!(store.invalidate_by_tag("x"), 2);

        assert!(!store.has("a"));
        assert!(!store.has("b"));
        assert!(store.has("c"));
        assert!(store.tag_index().keys("x").is_none());
        assert!(store.tag_index().keys("z").unwrap().is_empty());
        assert_eq!(store.stats().deletes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_delete_purges_tags() {
        let mut store = store();
        store.set("a".to_string(), json!(1), &SetOptions::new().tags(["x", "y"])).unwrap();

        store.delete("a");

        assert!(store.tag_index().keys("x").unwrap().is_empty());
        assert!(store.tag_index().keys("y").unwrap().is_empty());
        assert_eq!(store.invalidate_by_tag("x"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_overwrite_moves_tags() {
        let mut store = store();
        store.set("a".to_string(), json!(1), &SetOptions::new().tag("old")).unwrap();
        store.set("a".to_string(), json!(2), &SetOptions::new().tag("new")).unwrap();

        assert_eq!(store.invalidate_by_tag("old"), 0);
        assert!(store.has("a"));
        assert_eq!(store.invalidate_by_tag("new"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_invalidate_pattern() {
        let mut store = store();
        for key in ["model:1", "model:2", "model:all", "experiment:1"] {
            store.set(key.to_string(), json!(key), &SetOptions::new()).unwrap();
        }

        assert_eq!(store.invalidate_pattern("model:*"), 3);
        assert_eq!(store.len(), 1);
        assert!(store.has("experiment:1"));
        assert_eq!(store.invalidate_pattern("nothing:*"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_clear_keeps_cumulative_counters() {
        let mut store = store();
        store.set("a".to_string(), json!(1), &SetOptions::new().tag("x")).unwrap();
        store.get("a");
        store.get("b");

        store.clear();

        let stats = store.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.item_count, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert!(store.tag_index().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleanup_expired() {
        let mut store = store();

        store.set("short".to_string(), json!(1), &ttl(1)).unwrap();
        store
            .set("stale".to_string(), json!(2), &ttl(1).stale_ttl(Duration::from_secs(60)))
            .unwrap();
        store.set("long".to_string(), json!(3), &ttl(10)).unwrap();

        advance(Duration::from_secs(2)).await;

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        assert!(store.has("long"));
        // Still inside its stale window, so the sweep keeps it
        assert_eq!(store.get("stale"), Lookup::Stale(json!(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_unbounded_stale_window_does_not_break_reads_or_cleanup() {
        let mut store = store();

        store
            .set("forever".to_string(), json!(1), &ttl(1).stale_ttl(Duration::MAX))
            .unwrap();
        store.set("dead".to_string(), json!(2), &ttl(1)).unwrap();
        store
            .set("far".to_string(), json!(3), &SetOptions::new().ttl(Duration::from_secs(u64::MAX)))
            .unwrap();

        advance(Duration::from_secs(2)).await;

        assert_eq!(store.get("forever"), Lookup::Stale(json!(1)));
        assert_eq!(store.get("far"), Lookup::Fresh(json!(3)));
        assert_eq!(store.cleanup_expired(), 1);
        assert!(!store.entries().contains_key("dead"));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_touch_with_max_extension() {
        let mut store = store();
        store.set("k".to_string(), json!(1), &ttl(10)).unwrap();

        assert!(store.touch("k", Duration::MAX));
        assert_eq!(store.ttl("k"), Some(MAX_LIFETIME));
        assert!(store.has("k"));
    }
}
