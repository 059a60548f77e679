//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the container against a simple model across
//! random operation sequences.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{FifoCache, LruCache, Policy};

// == Test Configuration ==
const TEST_CAPACITY: usize = 50;

// == Strategies ==
/// Generates cache keys from a small alphabet so sequences revisit keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}".prop_map(|s| s)
}

fn value_strategy() -> impl Strategy<Value = u32> {
    any::<u32>()
}

#[derive(Debug, Clone)]
enum CacheOp {
    Store { key: String, value: u32 },
    Load { key: String },
    Peek { key: String },
    Update { key: String, value: u32 },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Store { key, value }),
        key_strategy().prop_map(|key| CacheOp::Load { key }),
        key_strategy().prop_map(|key| CacheOp::Peek { key }),
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Update { key, value }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

/// Applies `ops` to `cache` and to a reference map, checking that every
/// read agrees. Capacity must be large enough that nothing is evicted.
fn check_against_model<P: Policy<String, u32>>(
    cache: &mut P,
    ops: Vec<CacheOp>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, u32> = HashMap::new();

    for op in ops {
        match op {
            CacheOp::Store { key, value } => {
                cache.store(key.clone(), value);
                model.insert(key, value);
            }
            CacheOp::Load { key } => {
                prop_assert_eq!(cache.load(&key), model.get(&key).copied());
            }
            CacheOp::Peek { key } => {
                prop_assert_eq!(cache.peek(&key), model.get(&key).copied());
            }
            CacheOp::Update { key, value } => {
                cache.update(&key, value);
                if let Some(slot) = model.get_mut(&key) {
                    *slot = value;
                }
            }
            CacheOp::Delete { key } => {
                cache.delete(&key);
                model.remove(&key);
            }
        }

        prop_assert_eq!(cache.len(), model.len());
    }

    let keys: HashSet<String> = cache.keys().into_iter().collect();
    let expected: HashSet<String> = model.keys().cloned().collect();
    prop_assert_eq!(keys, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Without capacity or TTL pressure both policies behave like a map.
    #[test]
    fn prop_lru_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let mut cache: LruCache<String, u32> = LruCache::new();
        check_against_model(&mut cache, ops)?;
    }

    #[test]
    fn prop_fifo_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let mut cache: FifoCache<String, u32> = FifoCache::new();
        check_against_model(&mut cache, ops)?;
    }

    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut cache: LruCache<String, u32> = LruCache::new();

        cache.store(key.clone(), value);

        prop_assert_eq!(cache.load(&key), Some(value));
    }

    #[test]
    fn prop_overwrite_semantics(key in key_strategy(), v1 in value_strategy(), v2 in value_strategy()) {
        let mut cache: FifoCache<String, u32> = FifoCache::new();

        cache.store(key.clone(), v1);
        cache.store(key.clone(), v2);

        prop_assert_eq!(cache.load(&key), Some(v2));
        prop_assert_eq!(cache.len(), 1, "Overwrite must not duplicate");
    }

    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((0u32..500, value_strategy()), 1..300)
    ) {
        let mut lru: LruCache<u32, u32> = LruCache::new().with_capacity(TEST_CAPACITY);
        let mut fifo: FifoCache<u32, u32> = FifoCache::new().with_capacity(TEST_CAPACITY);

        for (key, value) in entries {
            lru.store(key, value);
            fifo.store(key, value);
            lru.load(&key);
            prop_assert!(lru.len() <= TEST_CAPACITY, "LRU size {} exceeds {}", lru.len(), TEST_CAPACITY);
            prop_assert!(fifo.len() <= TEST_CAPACITY, "FIFO size {} exceeds {}", fifo.len(), TEST_CAPACITY);
            prop_assert_eq!(lru.keys().len(), lru.len());
            prop_assert_eq!(fifo.keys().len(), fifo.len());
        }
    }

    // FIFO keeps exactly the most recent distinct insertions.
    #[test]
    fn prop_fifo_keeps_newest_inserts(keys in prop::collection::vec(0u32..1000, 1..200)) {
        let capacity = 10;
        let mut cache: FifoCache<u32, ()> = FifoCache::new().with_capacity(capacity);

        let mut order: Vec<u32> = Vec::new();
        for key in keys {
            cache.store(key, ());
            order.retain(|k| *k != key);
            order.push(key);
        }

        let start = order.len().saturating_sub(capacity);
        prop_assert_eq!(cache.keys(), order[start..].to_vec());
    }

    #[test]
    fn prop_resize_evicts_excess(count in 0usize..60, capacity in 1usize..40) {
        let mut cache: LruCache<usize, usize> = LruCache::new();
        for i in 0..count {
            cache.store(i, i);
        }

        let evicted = cache.resize(capacity);

        prop_assert_eq!(evicted, count.saturating_sub(capacity));
        prop_assert_eq!(cache.len(), count.min(capacity));
        prop_assert_eq!(cache.cap(), capacity);
    }
}

// Separate block with few cases for time-sensitive TTL checks
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let mut cache: LruCache<String, u32> = LruCache::new().with_ttl(Duration::from_millis(20));

        cache.store(key.clone(), value);
        prop_assert_eq!(cache.peek(&key), Some(value));

        sleep(Duration::from_millis(40));

        prop_assert_eq!(cache.load(&key), None);
        prop_assert!(!cache.contains(&key));
        prop_assert_eq!(cache.len(), 0);
    }
}
