//! Cache Module
//!
//! In-process caching with TTL expiration, stale-while-revalidate,
//! tag/pattern invalidation and size- and count-bounded eviction.

mod engine;
mod entry;
mod eviction;
mod fetcher;
pub mod keys;
mod options;
mod pattern;
mod stats;
mod store;
mod tags;


// Re-export public types
pub use engine::CacheEngine;
pub use entry::{estimate_size, CacheEntry, EntryState};
pub use eviction::EvictionPolicy;
pub use fetcher::{erase, Fetcher, FetcherRegistry, RegisteredFetcher, WarmItem};
pub use keys::{CacheKeys, TtlTier};
pub use options::SetOptions;
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::{CacheStore, Lookup};
pub use tags::TagIndex;

// == Public Constants ==
/// Maximum key length accepted by the admin API, in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Estimated bytes per character of a value's JSON form
pub const SIZE_FACTOR: usize = 2;

/// Longest TTL, stale window or touch extension an entry will carry; longer
/// requests are clamped to it (100 years)
pub const MAX_LIFETIME: std::time::Duration = std::time::Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Milliseconds of recency one read is worth when scoring eviction victims
pub const ACCESS_WEIGHT_MS: i128 = 1000;
