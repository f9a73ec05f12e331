//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{SetOptions, MAX_KEY_LENGTH, MAX_LIFETIME};

/// Request body for storing an entry (PUT /entries)
///
/// Durations are in seconds; omitted ones use the engine defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Optional stale window in seconds
    #[serde(default)]
    pub stale_ttl: Option<u64>,
    /// Tags to register the key under
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
            .or_else(|| validate_seconds("ttl", self.ttl))
            .or_else(|| validate_seconds("stale_ttl", self.stale_ttl))
    }

    /// Converts the request's timing and tags into write options.
    pub fn options(&self) -> SetOptions {
        SetOptions {
            ttl: self.ttl.map(Duration::from_secs),
            stale_ttl: self.stale_ttl.map(Duration::from_secs),
            tags: self.tags.clone(),
        }
    }
}

/// Request body for pattern invalidation (POST /invalidate)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidatePatternRequest {
    /// Glob where `*` matches any substring
    pub pattern: String,
}

/// Request body for extending an entry's lifetime (POST /entries/:key/touch)
#[derive(Debug, Clone, Deserialize)]
pub struct TouchRequest {
    /// New fresh lifetime in seconds, counted from now
    pub ttl: u64,
}

impl TouchRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_seconds("ttl", Some(self.ttl))
    }
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}

fn validate_seconds(field: &str, seconds: Option<u64>) -> Option<String> {
    match seconds {
        Some(secs) if secs > MAX_LIFETIME.as_secs() => Some(format!(
            "{} exceeds maximum of {} seconds",
            field,
            MAX_LIFETIME.as_secs()
        )),
        _ => None,
    }
}
