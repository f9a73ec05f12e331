//! API Module
//!
//! HTTP handlers and routing for the cache admin surface.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache statistics
//! - `PUT /entries` - Store a value
//! - `DELETE /entries` - Clear the cache
//! - `GET /entries/:key` - Read a value
//! - `DELETE /entries/:key` - Delete a key
//! - `POST /entries/:key/touch` - Extend a key's lifetime
//! - `DELETE /tags/:tag` - Invalidate a tag
//! - `POST /invalidate` - Invalidate keys matching a glob

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
