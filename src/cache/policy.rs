//! Policy Adapters
//!
//! Concrete replacement policies exposed through the [`Policy`] contract.

use std::marker::PhantomData;

use crate::cache::collection::{FifoOrder, LruOrder};
use crate::cache::container::Container;
use crate::cache::{CacheStats, Policy, Setting};

/// Least-recently-used cache: reads refresh recency.
pub type LruCache<K, V> = Container<K, V, LruOrder<K>>;

/// First-in-first-out cache: reads never change eviction order.
pub type FifoCache<K, V> = Container<K, V, FifoOrder<K>>;

// == Idle Cache ==
/// Caching disabled. Every read misses and every write is discarded, so
/// callers never need to branch on whether a cache is configured.
#[derive(Debug)]
pub struct IdleCache<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> IdleCache<K, V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> Default for IdleCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Policy<K, V> for IdleCache<K, V> {
    fn load(&mut self, _key: &K) -> Option<V> {
        None
    }

    fn peek(&mut self, _key: &K) -> Option<V> {
        None
    }

    fn update(&mut self, _key: &K, _value: V) {}

    fn store(&mut self, _key: K, _value: V) {}

    fn delete(&mut self, _key: &K) {}

    fn contains(&mut self, _key: &K) -> bool {
        false
    }

    fn keys(&self) -> Vec<K> {
        Vec::new()
    }

    fn purge(&mut self) {}

    fn resize(&mut self, _capacity: usize) -> usize {
        0
    }

    fn len(&self) -> usize {
        0
    }

    fn cap(&self) -> usize {
        0
    }

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }

    fn apply(&mut self, _setting: Setting<K, V>) {}
}
