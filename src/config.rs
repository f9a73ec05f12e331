//! Configuration Module
//!
//! Handles loading the cache engine and admin server settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Cache engine and admin server configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ceiling on the summed estimated size of all entries, in bytes
    pub max_size: usize,
    /// Ceiling on the number of entries
    pub max_items: usize,
    /// TTL in seconds for entries set without an explicit TTL
    pub default_ttl: u64,
    /// Stale window in seconds for entries set without an explicit one (0 = not stale-eligible)
    pub default_stale_ttl: u64,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
    /// Admin HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Size ceiling in bytes (default: 100 MiB)
    /// - `CACHE_MAX_ITEMS` - Entry count ceiling (default: 10000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_DEFAULT_STALE_TTL` - Default stale window in seconds (default: 0)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SERVER_PORT` - Admin HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env_or("CACHE_MAX_SIZE", defaults.max_size),
            max_items: env_or("CACHE_MAX_ITEMS", defaults.max_items),
            default_ttl: env_or("CACHE_DEFAULT_TTL", defaults.default_ttl),
            default_stale_ttl: env_or("CACHE_DEFAULT_STALE_TTL", defaults.default_stale_ttl),
            sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Default TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Default stale window as a `Duration`.
    pub fn default_stale_ttl(&self) -> Duration {
        Duration::from_secs(self.default_stale_ttl)
    }

    /// Sweep period as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: 100 * 1024 * 1024,
            max_items: 10_000,
            default_ttl: 300,
            default_stale_ttl: 0,
            sweep_interval: 60,
            server_port: 3000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
