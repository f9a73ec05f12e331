//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::CacheEngine;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    GetResponse, HealthResponse, InvalidatePatternRequest, InvalidateResponse, MessageResponse,
    SetRequest, StatsResponse, TouchRequest,
};

/// Application state shared across all handlers.
///
/// Holds a handle to the process-wide cache engine.
#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: CacheEngine,
}

impl AppState {
    /// Creates a new AppState around an existing engine.
    pub fn new(engine: CacheEngine) -> Self {
        Self { engine }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheEngine::from_config(config))
    }
}

/// Handler for PUT /entries
///
/// Stores any JSON value under a key with optional TTL, stale window and tags.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let options = req.options();
    state.engine.set_value(&req.key, req.value, &options).await?;

    Ok(Json(MessageResponse::set(req.key)))
}

/// Handler for GET /entries/:key
///
/// A stale hit is served and schedules a refresh, like any other read.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .engine
        .get_value(&key)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    let ttl_remaining_ms = state
        .engine
        .ttl(&key)
        .await
        .map(|remaining| u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX));

    Ok(Json(GetResponse::new(key, value, ttl_remaining_ms)))
}

/// Handler for DELETE /entries/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.engine.delete(&key).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(MessageResponse::deleted(key)))
}

/// Handler for DELETE /entries
pub async fn clear_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.engine.clear().await;
    Json(MessageResponse::cleared())
}

/// Handler for POST /entries/:key/touch
///
/// Restarts the entry's fresh lifetime at `ttl` seconds from now.
pub async fn touch_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<TouchRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    if !state.engine.touch(&key, Duration::from_secs(req.ttl)).await {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(MessageResponse::touched(key)))
}

/// Handler for DELETE /tags/:tag
pub async fn invalidate_tag_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.engine.invalidate_by_tag(&tag).await;
    Json(InvalidateResponse { removed })
}

/// Handler for POST /invalidate
pub async fn invalidate_pattern_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidatePatternRequest>,
) -> Result<Json<InvalidateResponse>> {
    if req.pattern.is_empty() {
        return Err(CacheError::InvalidRequest("Pattern cannot be empty".to_string()));
    }

    let removed = state.engine.invalidate_pattern(&req.pattern).await;
    Ok(Json(InvalidateResponse { removed }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.engine.get_stats().await;
    let registered = state.engine.registered_fetchers().await;

    Json(StatsResponse::new(&stats, registered))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
