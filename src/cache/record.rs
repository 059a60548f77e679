//! Record Cache Module
//!
//! Record store sharing one TTL across all entries. Expiry is lazy: a read
//! that finds an expired record removes it and reports
//! [`CacheError::Expired`] once. A background collector (see
//! [`spawn_collector`](crate::tasks::spawn_collector)) forces that path for
//! keys nobody reads again. Expirations are queued only while a collector
//! is attached.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::tasks::{Expiry, ExpiryQueue};

#[derive(Debug)]
struct Record<V> {
    id: u64,
    value: V,
    /// None when the deadline is not representable
    expires_at: Option<Instant>,
}

impl<V> Record<V> {
    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

struct Shared<K, V> {
    records: Mutex<HashMap<K, Record<V>>>,
    queue: ExpiryQueue<K>,
    ttl: Duration,
    next_id: AtomicU64,
    /// Set while a collector drains `queue`; written under the records lock
    collecting: AtomicBool,
}

// == Record Cache ==
/// Thread-safe store with a single global TTL. Cloning shares the store.
pub struct RecordCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for RecordCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<K, V> RecordCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Display,
    V: Clone,
{
    // == Constructor ==
    /// Creates a store whose records live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                records: Mutex::new(HashMap::new()),
                queue: ExpiryQueue::new(),
                ttl,
                next_id: AtomicU64::new(0),
                collecting: AtomicBool::new(false),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.shared.ttl
    }

    // == Store ==
    /// Inserts or overwrites `key`, queueing its expiration when a
    /// collector is attached.
    pub fn store(&self, key: K, value: V) {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let expires_at = Instant::now().checked_add(self.shared.ttl);

        let mut records = self.shared.records.lock();
        records.insert(
            key.clone(),
            Record {
                id,
                value,
                expires_at,
            },
        );

        if let Some(expires_at) = expires_at {
            if self.shared.collecting.load(Ordering::Acquire) {
                self.shared.queue.push(Expiry {
                    id,
                    key,
                    expires_at,
                });
            }
        }
    }

    // == Load ==
    /// Returns the live value for `key`.
    ///
    /// # Returns
    /// - `Ok(Some(value))` if present and unexpired
    /// - `Err(CacheError::Expired)` if this access discovered the expiry
    /// - `Ok(None)` otherwise
    pub fn load(&self, key: &K) -> Result<Option<V>> {
        let mut records = self.shared.records.lock();

        let expired = match records.get(key) {
            None => return Ok(None),
            Some(record) => record.is_expired_at(Instant::now()),
        };

        if expired {
            records.remove(key);
            debug!(key = %key, "Record expired");
            return Err(CacheError::Expired(key.to_string()));
        }

        Ok(records.get(key).map(|record| record.value.clone()))
    }

    /// Live value for `key`. Never removes or reports an expired record.
    pub fn peek(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.shared
            .records
            .lock()
            .get(key)
            .filter(|record| !record.is_expired_at(now))
            .map(|record| record.value.clone())
    }

    // == Delete ==
    pub fn delete(&self, key: &K) {
        self.shared.records.lock().remove(key);
    }

    /// Resident keys, including expired records not yet collected.
    pub fn keys(&self) -> Vec<K> {
        self.shared.records.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.shared.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.records.lock().is_empty()
    }

    // == Purge ==
    /// Drops every record. Queued expirations become stale and are skipped.
    pub fn purge(&self) {
        self.shared.records.lock().clear();
    }

    // == Collector Hooks ==
    pub(crate) fn queue(&self) -> &ExpiryQueue<K> {
        &self.shared.queue
    }

    /// Starts queueing expirations, seeding the queue with resident records
    /// in deadline order. Returns false if a collector is already attached.
    pub(crate) fn attach_collector(&self) -> bool {
        let records = self.shared.records.lock();
        if self.shared.collecting.swap(true, Ordering::AcqRel) {
            return false;
        }

        let mut pending: Vec<Expiry<K>> = records
            .iter()
            .filter_map(|(key, record)| {
                record.expires_at.map(|expires_at| Expiry {
                    id: record.id,
                    key: key.clone(),
                    expires_at,
                })
            })
            .collect();
        pending.sort_by_key(|expiry| expiry.expires_at);
        for expiry in pending {
            self.shared.queue.push(expiry);
        }
        true
    }

    /// Stops queueing expirations and drops queued ones.
    pub(crate) fn detach_collector(&self) {
        let _records = self.shared.records.lock();
        self.shared.collecting.store(false, Ordering::Release);
        while self.shared.queue.next().is_some() {}
    }

    /// True if `key` is still held by the store that produced record `id`.
    pub(crate) fn holds(&self, key: &K, id: u64) -> bool {
        self.shared
            .records
            .lock()
            .get(key)
            .is_some_and(|record| record.id == id)
    }
}
