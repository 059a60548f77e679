//! Tier Module
//!
//! Fallible cache contract for stores that may fail (disk, remote session
//! stores) and the combinators built on it.
//!
//! A [`SyncCache`] is a `Tier` that never fails, so memory and durable
//! stores compose freely inside a [`Replicator`].

mod file;
mod replicator;

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

pub use file::{FileSystemCache, FILE_SUFFIX};
pub use replicator::Replicator;

use crate::cache::{Cache, RecordCache, SyncCache};
use crate::error::Result;

// == Tier Trait ==
/// A cache whose operations may fail.
pub trait Tier<K, V>: Send + Sync {
    /// `Ok(None)` is a miss.
    fn load(&self, key: &K) -> Result<Option<V>>;

    fn store(&self, key: K, value: V) -> Result<()>;

    /// Deleting an absent key succeeds.
    fn delete(&self, key: &K) -> Result<()>;

    fn keys(&self) -> Result<Vec<K>>;
}

impl<K, V> Tier<K, V> for SyncCache<K, V> {
    fn load(&self, key: &K) -> Result<Option<V>> {
        Ok(Cache::load(self, key))
    }

    fn store(&self, key: K, value: V) -> Result<()> {
        Cache::store(self, key, value);
        Ok(())
    }

    fn delete(&self, key: &K) -> Result<()> {
        Cache::delete(self, key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<K>> {
        Ok(Cache::keys(self))
    }
}

impl<K, V, T> Tier<K, V> for Arc<T>
where
    T: Tier<K, V> + ?Sized,
{
    fn load(&self, key: &K) -> Result<Option<V>> {
        (**self).load(key)
    }

    fn store(&self, key: K, value: V) -> Result<()> {
        (**self).store(key, value)
    }

    fn delete(&self, key: &K) -> Result<()> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<K>> {
        (**self).keys()
    }
}

impl<K, V> Tier<K, V> for RecordCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Display + Send + Sync,
    V: Clone + Send + Sync,
{
    fn load(&self, key: &K) -> Result<Option<V>> {
        RecordCache::load(self, key)
    }

    fn store(&self, key: K, value: V) -> Result<()> {
        RecordCache::store(self, key, value);
        Ok(())
    }

    fn delete(&self, key: &K) -> Result<()> {
        RecordCache::delete(self, key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<K>> {
        Ok(RecordCache::keys(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LruCache;
    use std::time::Duration;

    #[test]
    fn test_memory_cache_is_infallible_tier() {
        let cache: SyncCache<String, u32> = SyncCache::new(LruCache::new());

        Tier::store(&cache, "a".to_string(), 1).unwrap();
        assert_eq!(Tier::load(&cache, &"a".to_string()).unwrap(), Some(1));
        assert_eq!(Tier::keys(&cache).unwrap(), vec!["a".to_string()]);

        Tier::delete(&cache, &"a".to_string()).unwrap();
        assert_eq!(Tier::load(&cache, &"a".to_string()).unwrap(), None);
    }

    #[test]
    fn test_record_cache_tier_reports_expiry() {
        let cache = RecordCache::new(Duration::from_millis(20));
        Tier::store(&cache, "a".to_string(), 1).unwrap();

        std::thread::sleep(Duration::from_millis(40));

        let err = Tier::load(&cache, &"a".to_string()).unwrap_err();
        assert!(err.is_expired());
    }
}
