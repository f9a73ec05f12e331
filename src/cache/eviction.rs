//! Eviction Policy Module
//!
//! Approximate LRU with access-frequency weighting.

use std::collections::HashMap;

use tokio::time::Instant;

use crate::cache::{CacheEntry, ACCESS_WEIGHT_MS};

// == Eviction Policy ==
/// Picks eviction victims by score.
///
/// `score = last_accessed_ms + access_count * ACCESS_WEIGHT_MS`, where
/// `last_accessed_ms` is measured from the policy's epoch. Lowest score is
/// evicted first. Each read is worth `ACCESS_WEIGHT_MS` of recency, so an
/// entry read often outlives a newer one that was never read. No entry is
/// exempt.
#[derive(Debug, Clone)]
pub struct EvictionPolicy {
    /// Reference point for converting instants into milliseconds
    epoch: Instant,
}

impl EvictionPolicy {
    // == Constructor ==
    /// Creates a policy whose clock starts now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    // == Score ==
    /// Eviction score of an entry; lower is evicted first.
    pub fn score(&self, entry: &CacheEntry) -> i128 {
        let last_accessed_ms = entry.last_accessed_at.saturating_duration_since(self.epoch).as_millis() as i128;
        last_accessed_ms + i128::from(entry.access_count) * ACCESS_WEIGHT_MS
    }

    // == Select Victim ==
    /// Returns the key with the lowest score, or None if there are no entries.
    ///
    /// Full linear scan. Ties break on key order so the choice is deterministic.
    pub fn select_victim(&self, entries: &HashMap<String, CacheEntry>) -> Option<String> {
        entries
            .iter()
            .min_by(|(ka, a), (kb, b)| self.score(a).cmp(&self.score(b)).then_with(|| ka.cmp(kb)))
            .map(|(key, _)| key.clone())
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::new()
    }
}
