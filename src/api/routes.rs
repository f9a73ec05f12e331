//! API Routes
//!
//! Configures the Axum router with the cache admin endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, get_handler, health_handler, invalidate_pattern_handler,
    invalidate_tag_handler, set_handler, stats_handler, touch_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Cache statistics
/// - `PUT /entries` - Store a value
/// - `DELETE /entries` - Clear the cache
/// - `GET /entries/:key` - Read a value
/// - `DELETE /entries/:key` - Delete a key
/// - `POST /entries/:key/touch` - Extend a key's lifetime
/// - `DELETE /tags/:tag` - Invalidate a tag
/// - `POST /invalidate` - Invalidate keys matching a glob
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/entries", put(set_handler).delete(clear_handler))
        .route("/entries/:key", get(get_handler).delete(delete_handler))
        .route("/entries/:key/touch", post(touch_handler))
        .route("/tags/:tag", delete(invalidate_tag_handler))
        .route("/invalidate", post(invalidate_pattern_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
