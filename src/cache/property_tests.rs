//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to verify the memory-accounting and statistics invariants
//! under arbitrary operation sequences.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::cache::{entry_size, NodeStore};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_MAX_MEMORY: u64 = 512;

// == Strategies ==
/// Generates cache keys from a small pool so operations collide.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,8}".prop_map(|s| s)
}

/// Generates values of varied size, some large enough to force eviction.
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,64}".prop_map(|s| s)
}

/// A single cache operation.
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations, memory accounting stays within the
    // cap after every successful set, and always equals the sum of stored
    // entry sizes.
    #[test]
    fn prop_memory_invariant(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store = NodeStore::new(TEST_MAX_MEMORY);
        let mut shadow: std::collections::HashMap<String, u64> =
            std::collections::HashMap::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let size = entry_size(&key, &value);
                    match store.set(key.clone(), value, None) {
                        Ok(()) => {
                            shadow.insert(key, size);
                            prop_assert!(
                                store.current_memory_bytes() <= TEST_MAX_MEMORY,
                                "memory cap violated after set"
                            );
                        }
                        Err(CacheError::CapacityExceeded(_)) => {
                            prop_assert!(size > TEST_MAX_MEMORY,
                                "set may only fail for items larger than the cap");
                        }
                        Err(e) => return Err(TestCaseError::fail(format!("{e}"))),
                    }
                }
                CacheOp::Get { key } => {
                    let _ = store.get(&key);
                }
                CacheOp::Delete { key } => {
                    if store.delete(&key).is_ok() {
                        shadow.remove(&key);
                    }
                }
            }

            // Shadow map over-approximates (it never observes evictions),
            // so the store can only hold a subset of it.
            prop_assert!(store.len() <= shadow.len());
        }
    }

    // Hits and misses exactly reflect the get outcomes observed.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = NodeStore::new(TEST_MAX_MEMORY);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let _ = store.set(key, value, None);
                }
                CacheOp::Get { key } => {
                    match store.get(&key) {
                        Ok(_) => expected_hits += 1,
                        Err(_) => expected_misses += 1,
                    }
                }
                CacheOp::Delete { key } => {
                    let _ = store.delete(&key);
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.item_count, store.len(), "Item count mismatch");
    }

    // Set followed immediately by get returns the stored value.
    #[test]
    fn prop_set_get_round_trip(key in key_strategy(), value in value_strategy()) {
        let mut store = NodeStore::new(TEST_MAX_MEMORY);
        store.set(key.clone(), value.clone(), None).unwrap();
        prop_assert_eq!(store.get(&key).unwrap(), value);
    }
}
