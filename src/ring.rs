//! Consistent Hash Ring Module
//!
//! Maps keys to an ordered list of candidate nodes using virtual-node
//! consistent hashing, so that adding or removing a node only remaps a
//! small fraction of the key space.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

/// Default number of virtual nodes per physical node.
pub const DEFAULT_VNODE_REPLICAS: usize = 100;

// == Hash Ring ==
/// Consistent hashing ring over physical node identifiers.
///
/// Each node is mapped to `vnode_replicas` virtual positions on a u128 ring.
/// A key is owned by the first virtual position clockwise from its own hash;
/// replica candidates are found by continuing the clockwise walk until enough
/// distinct physical nodes are collected.
#[derive(Debug, Clone)]
pub struct HashRing {
    /// Virtual node positions: ring position -> physical node
    vnodes: BTreeMap<u128, String>,
    /// Physical nodes currently on the ring
    nodes: HashSet<String>,
    /// Number of virtual positions per physical node
    vnode_replicas: usize,
}

impl HashRing {
    // == Constructor ==
    /// Creates a ring with `vnode_replicas` virtual positions per node,
    /// pre-populated with the given nodes.
    pub fn new(nodes: impl IntoIterator<Item = String>, vnode_replicas: usize) -> Self {
        let mut ring = Self {
            vnodes: BTreeMap::new(),
            nodes: HashSet::new(),
            vnode_replicas,
        };
        for node in nodes {
            ring.add_node(node);
        }
        ring
    }

    // == Add Node ==
    /// Adds a node and its virtual positions to the ring.
    ///
    /// Positions are derived deterministically from `node:i`, so re-adding a
    /// previously removed node restores its exact placement. Adding a node
    /// that is already present is a configuration error and is ignored.
    pub fn add_node(&mut self, node: String) {
        if !self.nodes.insert(node.clone()) {
            warn!(%node, "node already on ring, ignoring duplicate add");
            return;
        }

        for i in 0..self.vnode_replicas {
            let pos = vnode_position(&node, i);
            self.vnodes.insert(pos, node.clone());
        }
        debug!(%node, vnodes = self.vnode_replicas, "added node to ring");
    }

    // == Remove Node ==
    /// Removes a node and every virtual position belonging to it.
    pub fn remove_node(&mut self, node: &str) {
        if !self.nodes.remove(node) {
            return;
        }

        for i in 0..self.vnode_replicas {
            let pos = vnode_position(node, i);
            self.vnodes.remove(&pos);
        }
        debug!(%node, "removed node from ring");
    }

    // == Primary Node ==
    /// Returns the node owning `key`, or None if the ring is empty.
    pub fn primary_node(&self, key: &str) -> Option<&str> {
        if self.vnodes.is_empty() {
            return None;
        }

        let pos = key_position(key);
        self.vnodes
            .range(pos..)
            .chain(self.vnodes.range(..pos))
            .next()
            .map(|(_, node)| node.as_str())
    }

    // == Candidate Nodes ==
    /// Returns up to `count` distinct nodes for `key`, in replica priority
    /// order: index 0 is the primary, the rest are ordered backups.
    ///
    /// Walks clockwise from the key's position, skipping virtual positions
    /// whose physical node was already selected. Deterministic for a fixed
    /// ring state and key.
    pub fn candidate_nodes(&self, key: &str, count: usize) -> Vec<String> {
        if self.vnodes.is_empty() || count == 0 {
            return Vec::new();
        }

        let pos = key_position(key);
        let max_distinct = count.min(self.nodes.len());
        let mut candidates: Vec<String> = Vec::with_capacity(max_distinct);

        for (_, node) in self.vnodes.range(pos..).chain(self.vnodes.range(..pos)) {
            if !candidates.iter().any(|c| c == node) {
                candidates.push(node.clone());
                if candidates.len() == max_distinct {
                    break;
                }
            }
        }

        candidates
    }

    // == Physical Nodes ==
    /// Returns all distinct physical nodes currently on the ring.
    pub fn physical_nodes(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }

    /// Returns the number of physical nodes on the ring.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the total number of virtual positions on the ring.
    pub fn vnode_count(&self) -> usize {
        self.vnodes.len()
    }
}

// == Position Derivation ==
/// Position of virtual node `index` for `node`: blake3("node:index") as u128.
fn vnode_position(node: &str, index: usize) -> u128 {
    hash_to_position(format!("{}:{}", node, index).as_bytes())
}

/// Position of a key on the ring.
fn key_position(key: &str) -> u128 {
    hash_to_position(key.as_bytes())
}

/// Truncates a blake3 digest to the u128 ring coordinate space.
fn hash_to_position(input: &[u8]) -> u128 {
    let digest = blake3::hash(input);
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&digest.as_bytes()[..16]);
    u128::from_be_bytes(buf)
}
