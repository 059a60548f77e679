//! Cache Module
//!
//! Keyed stores with pluggable replacement policy (LRU, FIFO, IDLE), TTL
//! expiration, capacity-bound eviction and asynchronous notification hooks.
//!
//! Two contracts are exposed:
//! - [`Policy`]: the raw single-threaded engine, mutated through `&mut self`.
//! - [`Cache`]: the shared contract every caller consumes, usable through
//!   `&self` from any number of threads ([`SyncCache`] bridges the two).

mod collection;
mod container;
mod dispatch;
mod entry;
mod list;
mod policy;
mod record;
mod registry;
mod stats;
mod synced;
mod typed;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;
use std::time::Duration;

// Re-export public types
pub use collection::{Collection, FifoOrder, LruOrder};
pub use container::Container;
pub use entry::CacheEntry;
pub use list::{NodeId, OrderList};
pub use policy::{FifoCache, IdleCache, LruCache};
pub use record::RecordCache;
pub use registry::{Kind, Registry, UnknownPolicy};
pub use stats::CacheStats;
pub use synced::SyncCache;
pub use typed::{load_as, AnyValue};

// == Callbacks ==
/// Invoked with the removed key and value whenever an entry is evicted.
pub type OnEvicted<K, V> = Arc<dyn Fn(K, V) + Send + Sync>;

/// Advisory signal that an entry's TTL elapsed. The entry stays resident
/// until the next access to its key runs the lazy expiry path.
pub type OnExpired<K> = Arc<dyn Fn(K) + Send + Sync>;

// == Settings ==
/// Construction-time option applied to a policy after it is built.
///
/// Policies ignore settings they have no use for.
pub enum Setting<K, V> {
    /// Maximum number of entries, 0 = unbounded
    Capacity(usize),
    /// Lifetime of every entry, zero = never expires
    Ttl(Duration),
    OnEvicted(OnEvicted<K, V>),
    OnExpired(OnExpired<K>),
}

/// Bounds the cache to `n` entries.
pub fn capacity<K, V>(n: usize) -> Setting<K, V> {
    Setting::Capacity(n)
}

/// Expires every entry `d` after it was stored.
pub fn ttl<K, V>(d: Duration) -> Setting<K, V> {
    Setting::Ttl(d)
}

/// Registers an eviction callback.
pub fn register_on_evicted<K, V, F>(f: F) -> Setting<K, V>
where
    F: Fn(K, V) + Send + Sync + 'static,
{
    Setting::OnEvicted(Arc::new(f))
}

/// Registers an expiry callback. The callback should touch the key
/// (`peek` or `load`) to finalize removal.
pub fn register_on_expired<K, V, F>(f: F) -> Setting<K, V>
where
    F: Fn(K) + Send + Sync + 'static,
{
    Setting::OnExpired(Arc::new(f))
}

// == Policy Trait ==
/// Single-threaded cache engine. Reads take `&mut self` because they may
/// reorder entries or evict an expired one.
pub trait Policy<K, V>: Send + Sync {
    /// Returns the value and marks the key as recently used.
    fn load(&mut self, key: &K) -> Option<V>;

    /// Returns the value without touching the ordering.
    fn peek(&mut self, key: &K) -> Option<V>;

    /// Replaces a value in place, keeping its position and deadline.
    fn update(&mut self, key: &K, value: V);

    /// Inserts or overwrites, then enforces capacity.
    fn store(&mut self, key: K, value: V);

    /// Evicts the key if present.
    fn delete(&mut self, key: &K);

    /// Like `peek` with the value discarded; may run lazy expiry.
    fn contains(&mut self, key: &K) -> bool;

    /// Resident keys, oldest eviction candidate first.
    fn keys(&self) -> Vec<K>;

    /// Removes every entry.
    fn purge(&mut self);

    /// Sets the capacity and returns how many entries were evicted to fit.
    fn resize(&mut self, capacity: usize) -> usize;

    /// Number of resident entries, expired ones not yet touched included.
    fn len(&self) -> usize;

    /// True when no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity, 0 = unbounded.
    fn cap(&self) -> usize;

    /// Snapshot of the hit, miss and eviction counters.
    fn stats(&self) -> CacheStats;

    /// Applies one construction-time setting.
    fn apply(&mut self, setting: Setting<K, V>);
}

// == Cache Trait ==
/// Thread-safe cache contract consumed by authentication strategies.
///
/// Every method has the semantics of its [`Policy`] counterpart.
pub trait Cache<K, V>: Send + Sync {
    fn load(&self, key: &K) -> Option<V>;

    fn peek(&self, key: &K) -> Option<V>;

    fn update(&self, key: &K, value: V);

    fn store(&self, key: K, value: V);

    fn delete(&self, key: &K);

    fn contains(&self, key: &K) -> bool;

    fn keys(&self) -> Vec<K>;

    fn purge(&self);

    fn resize(&self, capacity: usize) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cap(&self) -> usize;

    fn stats(&self) -> CacheStats;
}

impl<K, V, C> Cache<K, V> for Arc<C>
where
    C: Cache<K, V> + ?Sized,
{
    fn load(&self, key: &K) -> Option<V> {
        (**self).load(key)
    }

    fn peek(&self, key: &K) -> Option<V> {
        (**self).peek(key)
    }

    fn update(&self, key: &K, value: V) {
        (**self).update(key, value)
    }

    fn store(&self, key: K, value: V) {
        (**self).store(key, value)
    }

    fn delete(&self, key: &K) {
        (**self).delete(key)
    }

    fn contains(&self, key: &K) -> bool {
        (**self).contains(key)
    }

    fn keys(&self) -> Vec<K> {
        (**self).keys()
    }

    fn purge(&self) {
        (**self).purge()
    }

    fn resize(&self, capacity: usize) -> usize {
        (**self).resize(capacity)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn cap(&self) -> usize {
        (**self).cap()
    }

    fn stats(&self) -> CacheStats {
        (**self).stats()
    }
}
