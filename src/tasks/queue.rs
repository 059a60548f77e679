//! Expiry Queue
//!
//! FIFO of pending expirations feeding the TTL collector. Under one global
//! TTL, insertion order is expiration order, so the head is always the next
//! record due.

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::Notify;

// == Expiry Record ==
/// One pending expiration, created on every store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry<K> {
    /// Identifies the store that produced this record
    pub id: u64,
    pub key: K,
    pub expires_at: Instant,
}

// == Expiry Queue ==
#[derive(Debug)]
pub struct ExpiryQueue<K> {
    items: Mutex<VecDeque<Expiry<K>>>,
    /// Single-permit wake signal, raised when the queue turns non-empty
    wake: Notify,
}

impl<K> ExpiryQueue<K> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            wake: Notify::new(),
        }
    }

    // == Push ==
    /// Appends a record, waking the collector if it was idle.
    pub fn push(&self, record: Expiry<K>) {
        let was_empty = {
            let mut items = self.items.lock();
            let was_empty = items.is_empty();
            items.push_back(record);
            was_empty
        };

        if was_empty {
            self.wake.notify_one();
        }
    }

    // == Next ==
    /// Pops the oldest record, or None when empty.
    pub fn next(&self) -> Option<Expiry<K>> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    // == Wait ==
    /// Resolves once a push turned the queue non-empty. A wake raised while
    /// nobody was waiting is kept for the next call.
    pub async fn wait(&self) {
        self.wake.notified().await;
    }
}

impl<K> Default for ExpiryQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
