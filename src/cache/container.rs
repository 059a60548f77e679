//! Container Module
//!
//! Policy-independent cache engine: a key → entry map plus one
//! [`Collection`] deciding eviction order.
//!
//! Invariant: the keys in `entries` and the nodes in `order` are always the
//! same set. Every path that removes an entry goes through `unlink` or
//! `evict`, which remove it from both.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::collection::Collection;
use crate::cache::dispatch::{spawn_callback, Timer};
use crate::cache::entry::CacheEntry;
use crate::cache::{CacheStats, OnEvicted, OnExpired, Policy, Setting};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reason {
    Capacity,
    Expired,
    Deleted,
    Purged,
}

// == Container ==
/// Generic cache engine parameterized by its ordering collection.
///
/// Not thread-safe on its own; share it through
/// [`SyncCache`](crate::cache::SyncCache).
pub struct Container<K, V, C> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Eviction ordering
    order: C,
    /// Maximum number of entries, 0 = unbounded
    capacity: usize,
    /// Entry lifetime, None = never expires
    ttl: Option<Duration>,
    on_evicted: Option<OnEvicted<K, V>>,
    on_expired: Option<OnExpired<K>>,
    stats: CacheStats,
}

impl<K, V, C> Container<K, V, C>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Collection<K>,
{
    // == Constructor ==
    /// Creates an unbounded, non-expiring container over `order`.
    pub fn with_collection(order: C) -> Self {
        Self {
            entries: HashMap::new(),
            order,
            capacity: 0,
            ttl: None,
            on_evicted: None,
            on_expired: None,
            stats: CacheStats::new(),
        }
    }

    // == Builder Helpers ==
    /// Sets the capacity without evicting.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the TTL applied to entries stored from now on.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl).filter(|ttl| !ttl.is_zero());
        self
    }

    // == Expires At ==
    /// Returns the deadline of a resident entry, if it has one.
    ///
    /// Pure introspection: an already expired entry is reported, not evicted.
    pub fn expires_at(&self, key: &K) -> Option<Instant> {
        self.entries.get(key).and_then(|entry| entry.expires_at)
    }

    // == Resolve ==
    /// Returns true if a live entry exists for `key`, evicting it first if
    /// its deadline has passed.
    fn resolve(&mut self, key: &K) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.stats.record_expiration();
            self.evict(key, Reason::Expired);
            return false;
        }

        true
    }

    fn read(&mut self, key: &K, touch: bool) -> Option<V> {
        if !self.resolve(key) {
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get(key)?;
        if touch {
            self.order.touch(entry.node);
        }
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Unlink ==
    /// Removes an entry from the map and the collection without callbacks.
    fn unlink(&mut self, key: &K) -> Option<(K, CacheEntry<V>)> {
        let (key, mut entry) = self.entries.remove_entry(key)?;
        entry.stop_timer();
        self.order.remove(entry.node);
        Some((key, entry))
    }

    // == Evict ==
    /// Removes an entry and notifies `on_evicted`.
    fn evict(&mut self, key: &K, reason: Reason) -> bool {
        let Some((key, entry)) = self.unlink(key) else {
            return false;
        };

        self.stats.record_eviction();
        debug!(
            reason = ?reason,
            remaining = self.entries.len(),
            "Evicted cache entry"
        );

        if let Some(on_evicted) = &self.on_evicted {
            let on_evicted = on_evicted.clone();
            let value = entry.value;
            spawn_callback(move || on_evicted(key, value));
        }

        true
    }

    fn evict_oldest(&mut self) -> bool {
        let oldest = self
            .order
            .oldest()
            .and_then(|id| self.order.key(id))
            .cloned();

        match oldest {
            Some(key) => self.evict(&key, Reason::Capacity),
            None => false,
        }
    }

    // == Remove Oldest ==
    /// Evicts one entry if the container is over capacity.
    fn remove_oldest(&mut self) -> bool {
        if self.capacity == 0 || self.order.len() <= self.capacity {
            return false;
        }
        self.evict_oldest()
    }
}

impl<K, V, C> Container<K, V, C>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Collection<K> + Default,
{
    /// Creates an unbounded, non-expiring container.
    pub fn new() -> Self {
        Self::with_collection(C::default())
    }
}

impl<K, V, C> Default for Container<K, V, C>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Collection<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> Policy<K, V> for Container<K, V, C>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Collection<K>,
{
    // == Load ==
    fn load(&mut self, key: &K) -> Option<V> {
        self.read(key, true)
    }

    // == Peek ==
    fn peek(&mut self, key: &K) -> Option<V> {
        self.read(key, false)
    }

    // == Update ==
    fn update(&mut self, key: &K, value: V) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.value = value;
        }
    }

    // == Store ==
    /// Overwrites any previous entry for `key`; the old entry is dropped
    /// silently, without an eviction callback.
    fn store(&mut self, key: K, value: V) {
        self.unlink(&key);

        let node = self.order.push(key.clone());
        let mut entry = CacheEntry::new(value, node, self.ttl);

        if let (Some(deadline), Some(on_expired)) = (entry.expires_at, &self.on_expired) {
            let on_expired = on_expired.clone();
            let expired_key = key.clone();
            entry.timer = Some(Timer::schedule(deadline, move || on_expired(expired_key)));
        }

        self.entries.insert(key, entry);
        self.remove_oldest();
    }

    // == Delete ==
    fn delete(&mut self, key: &K) {
        self.evict(key, Reason::Deleted);
    }

    fn contains(&mut self, key: &K) -> bool {
        self.resolve(key)
    }

    fn keys(&self) -> Vec<K> {
        self.order.keys()
    }

    // == Purge ==
    fn purge(&mut self) {
        if self.on_evicted.is_some() {
            for key in self.order.keys() {
                self.evict(&key, Reason::Purged);
            }
            return;
        }

        for entry in self.entries.values_mut() {
            entry.stop_timer();
        }
        self.entries = HashMap::new();
        self.order.init();
    }

    // == Resize ==
    /// A capacity of 0 lifts the bound and evicts nothing.
    fn resize(&mut self, capacity: usize) -> usize {
        self.capacity = capacity;
        if capacity == 0 {
            return 0;
        }

        let excess = self.entries.len().saturating_sub(capacity);
        let mut evicted = 0;
        while evicted < excess && self.evict_oldest() {
            evicted += 1;
        }
        evicted
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn cap(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    fn apply(&mut self, setting: Setting<K, V>) {
        match setting {
            Setting::Capacity(capacity) => self.capacity = capacity,
            Setting::Ttl(ttl) => self.ttl = Some(ttl).filter(|ttl| !ttl.is_zero()),
            Setting::OnEvicted(f) => self.on_evicted = Some(f),
            Setting::OnExpired(f) => self.on_expired = Some(f),
        }
    }
}
