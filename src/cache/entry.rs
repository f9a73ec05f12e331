//! Cache Entry Module
//!
//! Defines individual cache entries, their freshness state and size estimation.

use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::cache::{MAX_LIFETIME, SIZE_FACTOR};

// == Entry State ==
/// Freshness of an entry relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// `now <= expires_at`
    Fresh,
    /// Past `expires_at` but inside the stale window; servable while a refresh runs
    Stale,
    /// Past every window; must be removed
    Expired,
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// When the entry was (last) written
    pub created_at: Instant,
    /// End of the fresh period
    pub expires_at: Instant,
    /// Extra time after `expires_at` during which the entry may be served stale
    pub stale_ttl: Duration,
    /// Number of successful reads
    pub access_count: u64,
    /// Time of the last successful read (or the write, if never read)
    pub last_accessed_at: Instant,
    /// Estimated byte footprint, fixed at write time
    pub size: usize,
    /// Tags this entry was registered under
    pub tags: Vec<String>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry written at `now`.
    ///
    /// `ttl` and `stale_ttl` are clamped to [`MAX_LIFETIME`].
    pub fn new(value: Value, ttl: Duration, stale_ttl: Duration, tags: Vec<String>, now: Instant) -> Self {
        let size = estimate_size(&value);
        Self {
            value,
            created_at: now,
            expires_at: deadline(now, ttl),
            stale_ttl: stale_ttl.min(MAX_LIFETIME),
            access_count: 0,
            last_accessed_at: now,
            size,
            tags,
        }
    }

    /// Whether the entry may be served after `expires_at`.
    pub fn stale_eligible(&self) -> bool {
        !self.stale_ttl.is_zero()
    }

    // == Is Fresh ==
    /// Freshness test only; ignores the stale window.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now <= self.expires_at
    }

    // == State ==
    /// Classifies the entry at `now`.
    pub fn state(&self, now: Instant) -> EntryState {
        if self.is_fresh(now) {
            EntryState::Fresh
        } else if self.stale_eligible() && self.within_stale_window(now) {
            EntryState::Stale
        } else {
            EntryState::Expired
        }
    }

    /// An unrepresentable window end counts as not yet reached.
    fn within_stale_window(&self, now: Instant) -> bool {
        self.expires_at
            .checked_add(self.stale_ttl)
            .map_or(true, |stale_until| now <= stale_until)
    }

    /// Records a successful read.
    pub fn record_access(&mut self, now: Instant) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }

    /// Restarts the fresh period at `now + extension`; the value is untouched.
    pub fn touch(&mut self, extension: Duration, now: Instant) {
        self.expires_at = deadline(now, extension);
    }

    // == Time To Live ==
    /// Remaining fresh time; zero once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

// == Utility Functions ==
/// `from + after`, with `after` clamped to [`MAX_LIFETIME`]. Never panics.
fn deadline(from: Instant, after: Duration) -> Instant {
    from.checked_add(after.min(MAX_LIFETIME)).unwrap_or(from)
}

/// Approximate footprint of a value: serialized JSON length times `SIZE_FACTOR`.
pub fn estimate_size(value: &Value) -> usize {
    let len = serde_json::to_string(value).map(|s| s.len()).unwrap_or(0);
    len * SIZE_FACTOR
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::time::advance;

    fn entry(ttl: u64, stale: u64) -> CacheEntry {
        CacheEntry::new(
            json!("test_value"),
            Duration::from_secs(ttl),
            Duration::from_secs(stale),
            Vec::new(),
            Instant::now(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_creation() {
        let entry = entry(60, 0);

        assert_eq!(entry.value, json!("test_value"));
        assert_eq!(entry.access_count, 0);
        assert!(!entry.stale_eligible());
        assert_eq!(entry.state(Instant::now()), EntryState::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_at_exact_boundary() {
        let entry = entry(10, 0);

        advance(Duration::from_secs(10)).await;
        assert!(entry.is_fresh(Instant::now()), "Entry should still be fresh at expires_at");

        advance(Duration::from_millis(1)).await;
        assert_eq!(entry.state(Instant::now()), EntryState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_window_transitions() {
        let entry = entry(10, 20);

        advance(Duration::from_secs(15)).await;
        assert!(!entry.is_fresh(Instant::now()));
        assert_eq!(entry.state(Instant::now()), EntryState::Stale);

        advance(Duration::from_secs(15)).await;
        assert_eq!(entry.state(Instant::now()), EntryState::Stale);

        advance(Duration::from_secs(1)).await;
        assert_eq!(entry.state(Instant::now()), EntryState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_and_ttl_remaining() {
        let mut entry = entry(10, 0);

        advance(Duration::from_secs(5)).await;
        assert_eq!(entry.ttl_remaining(Instant::now()), Duration::from_secs(5));

        entry.touch(Duration::from_secs(20), Instant::now());
        assert_eq!(entry.ttl_remaining(Instant::now()), Duration::from_secs(20));
        assert_eq!(entry.value, json!("test_value"));

        advance(Duration::from_secs(30)).await;
        assert_eq!(entry.ttl_remaining(Instant::now()), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_access() {
        let mut entry = entry(10, 0);

        advance(Duration::from_secs(3)).await;
        let now = Instant::now();
        entry.record_access(now);
        entry.record_access(now);

        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.last_accessed_at, now);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_durations_are_clamped() {
        let now = Instant::now();
        let entry = CacheEntry::new(json!(1), Duration::MAX, Duration::MAX, Vec::new(), now);

        assert_eq!(entry.ttl_remaining(now), MAX_LIFETIME);
        assert_eq!(entry.stale_ttl, MAX_LIFETIME);
        assert_eq!(entry.state(now), EntryState::Fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_stale_window_stays_stale() {
        let entry = CacheEntry::new(
            json!(1),
            Duration::from_secs(1),
            Duration::MAX,
            Vec::new(),
            Instant::now(),
        );

        advance(Duration::from_secs(2)).await;
        assert_eq!(entry.state(Instant::now()), EntryState::Stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_with_huge_extension() {
        let mut entry = entry(10, 0);

        entry.touch(Duration::from_secs(u64::MAX), Instant::now());
        assert_eq!(entry.ttl_remaining(Instant::now()), MAX_LIFETIME);
    }

    #[test]
    fn test_estimate_size() {
        // "\"abc\"" is 5 characters
        assert_eq!(estimate_size(&json!("abc")), 5 * SIZE_FACTOR);
        assert_eq!(estimate_size(&json!({"a": 1})), 7 * SIZE_FACTOR);
    }
}
