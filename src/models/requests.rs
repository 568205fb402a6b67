//! Request DTOs for the cache node API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::{Deserialize, Serialize};

/// Request body for the SET operation (PUT /cache/:key)
///
/// # Fields
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds (no TTL means the entry never expires)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}
