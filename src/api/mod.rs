//! API Module
//!
//! HTTP handlers and routing for the cache node REST API.
//!
//! # Endpoints
//! - `GET /cache/:key` - Retrieve a value by key
//! - `PUT /cache/:key` - Store a key-value pair
//! - `DELETE /cache/:key` - Delete a key
//! - `GET /stats` - Get node statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
