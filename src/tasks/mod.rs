//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Sweep: Removes entries past both their TTL and their stale window

mod sweep;

pub use sweep::spawn_sweep_task;
