//! dcache - A distributed in-memory cache
//!
//! A partitioned, replicated key-value cache: consistent-hash placement,
//! per-node bounded stores with TTL and LRU eviction, an HTTP node server,
//! and a client-side coordinator with best-effort replication and read
//! failover.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod ring;

pub use api::AppState;
pub use cache::{CacheStats, NodeStore};
pub use client::{CacheCoordinator, CoordinatorConfig};
pub use config::Config;
pub use ring::HashRing;
