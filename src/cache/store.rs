//! Node Store Module
//!
//! Single-node bounded cache combining HashMap storage with LRU tracking,
//! lazy TTL expiration and byte-level memory accounting.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{entry_size, CacheEntry, CacheStats, LruTracker};
use crate::error::{CacheError, Result};

// == Node Store ==
/// Bounded key-value store with LRU eviction and TTL support.
///
/// `current_memory_bytes` always equals the sum of entry sizes actually
/// stored, and never exceeds `max_memory_bytes` after a successful set.
/// Expiry is lazy: an expired entry keeps occupying memory until a get
/// detects it or eviction removes it.
#[derive(Debug)]
pub struct NodeStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Memory used by stored entries, in bytes
    current_memory_bytes: u64,
    /// Memory cap in bytes
    max_memory_bytes: u64,
}

impl NodeStore {
    // == Constructor ==
    /// Creates a new NodeStore bounded to `max_memory_bytes`.
    pub fn new(max_memory_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            current_memory_bytes: 0,
            max_memory_bytes,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired, refreshing its LRU
    /// position. An expired entry is removed on detection, its size is
    /// released, and the lookup counts as a miss.
    pub fn get(&mut self, key: &str) -> Result<String> {
        match self.entries.get_mut(key) {
            Some(entry) if entry.is_expired() => {
                let size = entry.size_bytes;
                self.entries.remove(key);
                self.lru.remove(key);
                self.current_memory_bytes -= size;
                self.stats.record_miss();
                Err(CacheError::Expired(key.to_string()))
            }
            Some(entry) => {
                entry.touch();
                let value = entry.value.clone();
                self.lru.touch(key);
                self.stats.record_hit();
                Ok(value)
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL in seconds.
    ///
    /// If the key already exists it is replaced and its old size released
    /// first. Least recently accessed entries are evicted until the new
    /// item fits. Fails only when the single item alone exceeds the memory
    /// cap; in that case the store is left untouched, including any value
    /// already held under the key.
    pub fn set(&mut self, key: String, value: String, ttl: Option<u64>) -> Result<()> {
        let new_size = entry_size(&key, &value);

        // Larger than the whole cap: would not fit even after evicting
        // everything.
        if new_size > self.max_memory_bytes {
            return Err(CacheError::CapacityExceeded(key));
        }

        // Replace, not add: release the old entry before making room.
        if let Some(old) = self.entries.remove(&key) {
            self.current_memory_bytes -= old.size_bytes;
            self.lru.remove(&key);
        }

        while self.current_memory_bytes + new_size > self.max_memory_bytes {
            match self.lru.evict_oldest() {
                Some(victim) => {
                    if let Some(evicted) = self.entries.remove(&victim) {
                        self.current_memory_bytes -= evicted.size_bytes;
                    }
                    self.stats.record_eviction();
                    debug!(key = %victim, "evicted least recently used entry");
                }
                // Unreachable: the item fits once the store is empty.
                None => return Err(CacheError::CapacityExceeded(key)),
            }
        }

        let entry = CacheEntry::new(&key, value, ttl);
        self.current_memory_bytes += entry.size_bytes;
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);

        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key, releasing its size.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_memory_bytes -= entry.size_bytes;
                self.lru.remove(key);
                Ok(())
            }
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    // == Clear ==
    /// Removes all entries and resets memory accounting.
    ///
    /// Hit, miss and eviction counters are preserved.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.current_memory_bytes = 0;
    }

    // == Stats ==
    /// Returns an internally consistent snapshot of the node's metrics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.current_memory_bytes = self.current_memory_bytes;
        stats.item_count = self.entries.len();
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current memory used by stored entries, in bytes.
    pub fn current_memory_bytes(&self) -> u64 {
        self.current_memory_bytes
    }

    /// The configured memory cap in bytes.
    pub fn max_memory_bytes(&self) -> u64 {
        self.max_memory_bytes
    }
}
