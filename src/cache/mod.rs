//! Cache Module
//!
//! Per-node bounded in-memory store with lazy TTL expiration, LRU eviction
//! and byte-level memory accounting.

mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, entry_size, CacheEntry};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::NodeStore;
