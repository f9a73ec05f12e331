//! MLOps Cache - an in-process cache engine for MLOps metadata
//!
//! Provides TTL expiration, stale-while-revalidate, tag and pattern
//! invalidation and size- and count-bounded eviction, plus a small admin
//! HTTP surface.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheEngine, CacheKeys, CacheStats, SetOptions, TtlTier, WarmItem};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
