//! Cache Coordinator
//!
//! Client-side coordinator that routes operations to the correct replica
//! set over a consistent hash ring: best-effort replicated writes, ordered
//! read failover, and aggregated per-node statistics.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::models::{GetResponse, SetRequest, StatsResponse};
use crate::ring::{HashRing, DEFAULT_VNODE_REPLICAS};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of replicas a key is written to / read from.
pub const DEFAULT_REPLICA_FANOUT: usize = 2;

// == Coordinator Config ==
/// Client-side configuration knobs.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Virtual positions per physical node on the ring
    pub vnode_replicas: usize,
    /// Bound on every individual node RPC
    pub request_timeout: Duration,
    /// Number of replicas targeted by writes and consulted by reads
    pub replica_fanout: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            vnode_replicas: DEFAULT_VNODE_REPLICAS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            replica_fanout: DEFAULT_REPLICA_FANOUT,
        }
    }
}

// == Lookup Outcome ==
/// Outcome of a read against a single node.
///
/// A clean 404 is a definitive negative answer and must not be confused
/// with an unreachable or misbehaving node, which only means "ask the next
/// replica".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The node returned the value
    Found(String),
    /// The node answered definitively that the key is absent
    NotFound,
    /// Transport error, timeout, or an unexpected status
    NodeError,
}

// == Cache Coordinator ==
/// Routes cache operations across the nodes of a consistent hash ring.
///
/// Writes and deletes are best-effort replicated: the operation succeeds if
/// at least one targeted replica accepts it, so replicas can diverge and no
/// consistency is guaranteed between racing operations. Reads fail over in
/// replica priority order and stop at the first definitive answer.
pub struct CacheCoordinator {
    /// Ring over node base URLs; lookups take a brief read lock and never
    /// hold it across I/O
    ring: RwLock<HashRing>,
    /// Shared HTTP client with the configured timeout
    http: reqwest::Client,
    /// Replica fan-out for writes, deletes and read failover
    replica_fanout: usize,
}

impl CacheCoordinator {
    // == Constructor ==
    /// Creates a coordinator over the given node base URLs
    /// (e.g. `http://127.0.0.1:8001`).
    pub fn new(nodes: Vec<String>, config: CoordinatorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CacheError::Internal(e.to_string()))?;

        Ok(Self {
            ring: RwLock::new(HashRing::new(nodes, config.vnode_replicas)),
            http,
            replica_fanout: config.replica_fanout,
        })
    }

    // == Ring Membership ==
    /// Adds a node to the ring. Remaps only the keys the new node takes over.
    pub fn add_node(&self, node: String) {
        self.ring.write().expect("ring lock poisoned").add_node(node);
    }

    /// Removes a node and all its virtual positions from the ring.
    pub fn remove_node(&self, node: &str) {
        self.ring.write().expect("ring lock poisoned").remove_node(node);
    }

    /// Replica candidates for a key, primary first.
    pub fn candidate_nodes(&self, key: &str, count: usize) -> Vec<String> {
        self.ring
            .read()
            .expect("ring lock poisoned")
            .candidate_nodes(key, count)
    }

    // == Set ==
    /// Stores a key-value pair on up to `replica_fanout` nodes concurrently.
    ///
    /// Returns true if at least one replica accepted the write. A timeout or
    /// transport error on one node fails that write only, never the whole
    /// operation.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> bool {
        let nodes = self.candidate_nodes(key, self.replica_fanout);
        if nodes.is_empty() {
            return false;
        }

        let mut tasks = JoinSet::new();
        for node in nodes {
            let http = self.http.clone();
            let url = format!("{}/cache/{}", node, key);
            let body = SetRequest {
                value: value.to_string(),
                ttl,
            };
            tasks.spawn(async move {
                match http.put(&url).json(&body).send().await {
                    Ok(resp) if resp.status() == StatusCode::OK => true,
                    Ok(resp) => {
                        warn!(%url, status = %resp.status(), "replica rejected write");
                        false
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "replica write failed");
                        false
                    }
                }
            });
        }

        let mut success = false;
        while let Some(joined) = tasks.join_next().await {
            success |= joined.unwrap_or(false);
        }
        success
    }

    // == Get ==
    /// Retrieves a value, failing over across replicas in ring order.
    ///
    /// A clean 404 from the primary is authoritative and returned without
    /// contacting backups. Only node errors (transport failures, timeouts,
    /// unexpected statuses) trigger the ordered backup chain; it stops at
    /// the first definitive answer. Returns None when the key is absent or
    /// every candidate errored.
    pub async fn get(&self, key: &str) -> Option<String> {
        let candidates = self.candidate_nodes(key, self.replica_fanout);
        let primary = candidates.first()?;

        match self.lookup_on(primary, key).await {
            Lookup::Found(value) => return Some(value),
            Lookup::NotFound => return None,
            Lookup::NodeError => {
                debug!(node = %primary, %key, "primary lookup failed, trying backups");
            }
        }

        for backup in &candidates[1..] {
            match self.lookup_on(backup, key).await {
                Lookup::Found(value) => return Some(value),
                Lookup::NotFound => return None,
                Lookup::NodeError => continue,
            }
        }

        None
    }

    /// Single-node read, classified into a definitive or retryable outcome.
    async fn lookup_on(&self, node: &str, key: &str) -> Lookup {
        let url = format!("{}/cache/{}", node, key);
        match self.http.get(&url).send().await {
            Ok(resp) => match resp.status() {
                StatusCode::OK => match resp.json::<GetResponse>().await {
                    Ok(body) => Lookup::Found(body.value),
                    Err(e) => {
                        warn!(%url, error = %e, "malformed get response");
                        Lookup::NodeError
                    }
                },
                StatusCode::NOT_FOUND => Lookup::NotFound,
                status => {
                    warn!(%url, %status, "unexpected status from node");
                    Lookup::NodeError
                }
            },
            Err(e) => {
                warn!(%url, error = %e, "node unreachable");
                Lookup::NodeError
            }
        }
    }

    // == Delete ==
    /// Deletes a key from up to `replica_fanout` nodes concurrently.
    ///
    /// Returns true if at least one targeted node reported it deleted the
    /// key.
    pub async fn delete(&self, key: &str) -> bool {
        let nodes = self.candidate_nodes(key, self.replica_fanout);
        if nodes.is_empty() {
            return false;
        }

        let mut tasks = JoinSet::new();
        for node in nodes {
            let http = self.http.clone();
            let url = format!("{}/cache/{}", node, key);
            tasks.spawn(async move {
                match http.delete(&url).send().await {
                    Ok(resp) if resp.status() == StatusCode::OK => true,
                    Ok(_) => false,
                    Err(e) => {
                        warn!(%url, error = %e, "replica delete failed");
                        false
                    }
                }
            });
        }

        let mut success = false;
        while let Some(joined) = tasks.join_next().await {
            success |= joined.unwrap_or(false);
        }
        success
    }

    // == Stats ==
    /// Queries `/stats` on every distinct node in the ring concurrently.
    ///
    /// Nodes that fail to respond are skipped; partial results are returned
    /// rather than failing wholesale.
    pub async fn stats(&self) -> HashMap<String, StatsResponse> {
        let nodes = self
            .ring
            .read()
            .expect("ring lock poisoned")
            .physical_nodes();

        let mut tasks = JoinSet::new();
        for node in nodes {
            let http = self.http.clone();
            tasks.spawn(async move {
                let url = format!("{}/stats", node);
                match http.get(&url).send().await {
                    Ok(resp) if resp.status() == StatusCode::OK => {
                        match resp.json::<StatsResponse>().await {
                            Ok(stats) => Some((node, stats)),
                            Err(e) => {
                                warn!(%node, error = %e, "malformed stats response");
                                None
                            }
                        }
                    }
                    Ok(resp) => {
                        warn!(%node, status = %resp.status(), "stats request rejected");
                        None
                    }
                    Err(e) => {
                        warn!(%node, error = %e, "stats request failed");
                        None
                    }
                }
            });
        }

        let mut stats = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some((node, snapshot))) = joined {
                stats.insert(node, snapshot);
            }
        }
        stats
    }
}
