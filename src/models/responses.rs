//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for reading an entry (GET /entries/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
    /// Remaining fresh time in milliseconds (0 when served stale)
    pub ttl_remaining_ms: Option<u64>,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value, ttl_remaining_ms: Option<u64>) -> Self {
        Self {
            key: key.into(),
            value,
            ttl_remaining_ms,
        }
    }
}

/// Generic acknowledgement for writes and deletes
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Success message
    pub message: String,
    /// The key acted on, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl MessageResponse {
    pub fn set(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key: Some(key),
        }
    }

    pub fn deleted(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key: Some(key),
        }
    }

    pub fn touched(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' touched successfully", key),
            key: Some(key),
        }
    }

    pub fn cleared() -> Self {
        Self {
            message: "Cache cleared".to_string(),
            key: None,
        }
    }
}

/// Response body for tag and pattern invalidation
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of keys removed
    pub removed: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    /// Current summed estimated size in bytes
    pub size: usize,
    /// Current number of entries
    pub item_count: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Keys with a remembered fetcher
    pub registered_fetchers: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, registered_fetchers: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            deletes: stats.deletes,
            evictions: stats.evictions,
            size: stats.size,
            item_count: stats.item_count,
            hit_rate: stats.hit_rate(),
            registered_fetchers,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("model:1", json!({"name": "resnet"}), Some(1500));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "model:1");
        assert_eq!(json["value"]["name"], "resnet");
        assert_eq!(json["ttl_remaining_ms"], 1500);
    }

    #[test]
    fn test_message_response_serialize() {
        let json = serde_json::to_string(&MessageResponse::set("my_key")).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));

        let json = serde_json::to_value(MessageResponse::cleared()).unwrap();
        assert!(json.get("key").is_none());
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(&stats, 3);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.registered_fetchers, 3);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(&CacheStats::default(), 0);
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
