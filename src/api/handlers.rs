//! API Handlers
//!
//! HTTP request handlers for each cache node endpoint. Handlers are
//! stateless wrappers around the store; the store lock is never held
//! beyond a single handler invocation.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::cache::NodeStore;
use crate::error::{CacheError, Result};
use crate::models::{DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Contains the node store wrapped in Arc<RwLock<>> for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe node store
    pub store: Arc<RwLock<NodeStore>>,
}

impl AppState {
    /// Creates a new AppState with the given node store.
    pub fn new(store: NodeStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(NodeStore::new(config.max_memory_bytes))
    }
}

/// Handler for GET /cache/:key
///
/// Retrieves a value from the store. A 404 covers both "never set" and
/// "expired".
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: get refreshes LRU order and may remove an expired entry.
    let mut store = state.store.write().await;
    let value = store.get(&key)?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for PUT /cache/:key
///
/// Stores a key-value pair with optional TTL. Returns 507 when the item
/// cannot fit even after evicting everything, 400 on a malformed body.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: std::result::Result<Json<SetRequest>, JsonRejection>,
) -> Result<Json<SetResponse>> {
    let Json(req) = payload.map_err(|e| CacheError::InvalidRequest(e.to_string()))?;

    let mut store = state.store.write().await;
    store.set(key.clone(), req.value, req.ttl)?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for DELETE /cache/:key
///
/// Deletes a key from the store; 404 if it did not exist.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut store = state.store.write().await;
    store.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns a point-in-time snapshot of the node's metrics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.store.read().await;
    let stats = store.stats();

    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
///
/// Returns health status of the node.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
