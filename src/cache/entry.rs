//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support
//! and approximate size accounting.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub inserted_at: u64,
    /// Last successful access timestamp (Unix milliseconds)
    pub last_accessed_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
    /// Approximate size of the (key, value) pair in bytes
    pub size_bytes: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// Entries without a TTL never expire.
    ///
    /// TTLs large enough to overflow the millisecond clock saturate at
    /// u64::MAX, which is far enough in the future to never expire.
    pub fn new(key: &str, value: String, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl_seconds.map(|ttl| now.saturating_add(ttl.saturating_mul(1000)));
        let size_bytes = entry_size(key, &value);

        Self {
            value,
            inserted_at: now,
            last_accessed_at: now,
            expires_at,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration
    /// time. Entries with no TTL never expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Touch ==
    /// Records a successful access.
    pub fn touch(&mut self) {
        self.last_accessed_at = current_timestamp_ms();
    }
}

// == Utility Functions ==
/// Approximate memory cost of a (key, value) pair in bytes.
pub fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
