//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine and its admin surface.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Value can never fit under the configured size ceiling
    #[error("Entry too large: estimated {size} bytes exceeds max size of {max_size} bytes")]
    EntryTooLarge { size: usize, max_size: usize },

    /// Cache has no capacity to hold any entry
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Value could not be converted to or from its stored JSON form
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Caller-supplied fetcher failed; the original error is preserved
    #[error(transparent)]
    Fetch(#[from] anyhow::Error),
}

impl CacheError {
    // == Status Code ==
    /// HTTP status used when the error reaches the admin surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::EntryTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::CacheFull(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status_code(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
