//! Thread-Safe Wrapper
//!
//! Serializes access to a single-threaded [`Policy`] behind one
//! reader/writer lock. Anything that can reorder entries or evict takes the
//! write lock; pure introspection takes the read lock.

use parking_lot::RwLock;

use crate::cache::{Cache, CacheStats, Policy};

// == Sync Cache ==
/// Shareable cache built from any policy.
pub struct SyncCache<K, V> {
    inner: RwLock<Box<dyn Policy<K, V>>>,
}

impl<K, V> SyncCache<K, V> {
    // == Constructor ==
    /// Wraps a concrete policy.
    pub fn new<P>(policy: P) -> Self
    where
        P: Policy<K, V> + 'static,
    {
        Self::from_boxed(Box::new(policy))
    }

    /// Wraps an already boxed policy, as returned by the registry.
    pub fn from_boxed(policy: Box<dyn Policy<K, V>>) -> Self {
        Self {
            inner: RwLock::new(policy),
        }
    }
}

impl<K, V> Cache<K, V> for SyncCache<K, V> {
    fn load(&self, key: &K) -> Option<V> {
        self.inner.write().load(key)
    }

    fn peek(&self, key: &K) -> Option<V> {
        self.inner.write().peek(key)
    }

    fn update(&self, key: &K, value: V) {
        self.inner.write().update(key, value)
    }

    fn store(&self, key: K, value: V) {
        self.inner.write().store(key, value)
    }

    fn delete(&self, key: &K) {
        self.inner.write().delete(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.inner.write().contains(key)
    }

    fn keys(&self) -> Vec<K> {
        self.inner.read().keys()
    }

    fn purge(&self) {
        self.inner.write().purge()
    }

    fn resize(&self, capacity: usize) -> usize {
        self.inner.write().resize(capacity)
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }

    fn cap(&self) -> usize {
        self.inner.read().cap()
    }

    fn stats(&self) -> CacheStats {
        self.inner.read().stats()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{register_on_expired, ttl, LruCache};
    use std::sync::{Arc, OnceLock, Weak};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_sync_cache_concurrent_writers() {
        let cache = Arc::new(SyncCache::new(LruCache::<u32, u32>::new().with_capacity(64)));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        let key = t * 1000 + i;
                        cache.store(key, i);
                        cache.load(&key);
                        assert!(cache.len() <= 64);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 64);
        assert_eq!(cache.cap(), 64);
    }

    #[tokio::test]
    async fn test_expiry_callback_can_reenter_cache() {
        let slot: Arc<OnceLock<Weak<SyncCache<String, u32>>>> = Arc::new(OnceLock::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let handle = slot.clone();
        let mut policy: LruCache<String, u32> = LruCache::new();
        policy.apply(ttl(Duration::from_millis(30)));
        policy.apply(register_on_expired(move |key: String| {
            if let Some(cache) = handle.get().and_then(Weak::upgrade) {
                let finalized = cache.peek(&key).is_none();
                tx.send((key, finalized)).unwrap();
            }
        }));

        let cache = Arc::new(SyncCache::new(policy));
        slot.set(Arc::downgrade(&cache)).unwrap();

        cache.store("token".to_string(), 1);
        assert_eq!(cache.len(), 1);

        let (key, finalized) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(key, "token");
        assert!(finalized);
        assert_eq!(cache.len(), 0);
    }
}
