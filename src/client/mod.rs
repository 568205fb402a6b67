//! Client Module
//!
//! The coordinator that distributes cache operations across nodes: replica
//! placement via the hash ring, best-effort replicated writes, ordered read
//! failover, and aggregated statistics.

mod coordinator;

pub use coordinator::{
    CacheCoordinator, CoordinatorConfig, Lookup, DEFAULT_REPLICA_FANOUT, DEFAULT_REQUEST_TIMEOUT,
};
