//! Cache Statistics Module
//!
//! Tracks hit/miss accounting, write and removal counters, and current occupancy.

use serde::Serialize;

// == Cache Stats ==
/// Cache counters.
///
/// `hits`, `misses`, `sets`, `deletes` and `evictions` only ever grow.
/// `size` and `item_count` describe the store right now.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value, fresh or stale
    pub hits: u64,
    /// Reads that returned nothing
    pub misses: u64,
    /// Successful writes
    pub sets: u64,
    /// Non-eviction removals
    pub deletes: u64,
    /// Removals made by the eviction policy
    pub evictions: u64,
    /// Current summed estimated size in bytes
    pub size: usize,
    /// Current number of entries
    pub item_count: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Occupancy ==
    /// Overwrites the current-state counters.
    pub fn set_occupancy(&mut self, size: usize, item_count: usize) {
        self.size = size;
        self.item_count = item_count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.sets, 0);
        assert_eq!(stats.deletes, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.size, 0);
        assert_eq!(stats.item_count, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_three_hits_one_miss() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_hit_rate_all_misses() {
        let mut stats = CacheStats::new();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_write_and_removal_counters() {
        let mut stats = CacheStats::new();
        stats.record_set();
        stats.record_set();
        stats.record_delete();
        stats.record_eviction();
        stats.record_eviction();
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.deletes, 1);
        assert_eq!(stats.evictions, 2);
    }

    #[test]
    fn test_set_occupancy() {
        let mut stats = CacheStats::new();
        stats.set_occupancy(512, 4);
        assert_eq!(stats.size, 512);
        assert_eq!(stats.item_count, 4);

        stats.set_occupancy(0, 0);
        assert_eq!(stats.item_count, 0);
    }
}
