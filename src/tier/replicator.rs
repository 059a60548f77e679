//! Replicator Module
//!
//! Two-tier cache keeping a fast in-memory tier consistent with a durable
//! one. The persistent tier is the source of truth: writes reach it first
//! and only its errors reach the caller.

use std::marker::PhantomData;

use tracing::{debug, warn};

use crate::error::Result;
use crate::tier::Tier;

// == Replicator ==
/// Write-through / read-through combinator over two tiers.
///
/// Both tiers must already be thread-safe; the replicator adds no locking
/// and only fixes the order in which they are touched.
pub struct Replicator<K, V, M, P> {
    in_memory: M,
    persistent: P,
    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V, M, P> Replicator<K, V, M, P>
where
    M: Tier<K, V>,
    P: Tier<K, V>,
{
    // == Constructor ==
    pub fn new(in_memory: M, persistent: P) -> Self {
        Self {
            in_memory,
            persistent,
            _marker: PhantomData,
        }
    }

    pub fn in_memory(&self) -> &M {
        &self.in_memory
    }

    pub fn persistent(&self) -> &P {
        &self.persistent
    }

    pub fn into_parts(self) -> (M, P) {
        (self.in_memory, self.persistent)
    }
}

impl<K, V, M, P> Replicator<K, V, M, P>
where
    K: Ord + Clone,
    V: Clone,
    M: Tier<K, V>,
    P: Tier<K, V>,
{
    // == Is Synced ==
    /// True when both tiers hold exactly the same key set.
    pub fn is_synced(&self) -> Result<bool> {
        let mut memory = self.in_memory.keys()?;
        let mut durable = self.persistent.keys()?;
        memory.sort();
        durable.sort();
        Ok(memory == durable)
    }

    // == Sync ==
    /// Repopulates the in-memory tier from every persistent key.
    ///
    /// Keys whose persistent record turns out to be expired are skipped.
    pub fn sync(&self) -> Result<()> {
        if self.is_synced()? {
            return Ok(());
        }

        let keys = self.persistent.keys()?;
        debug!(keys = keys.len(), "Replaying persistent keys into memory");
        for key in keys {
            match self.load(&key) {
                Ok(_) => {}
                Err(err) if err.is_expired() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

impl<K, V, M, P> Tier<K, V> for Replicator<K, V, M, P>
where
    K: Clone,
    V: Clone,
    M: Tier<K, V>,
    P: Tier<K, V>,
{
    // == Load ==
    /// Memory first; an in-memory error counts as a miss. A persistent hit
    /// is copied back into memory.
    fn load(&self, key: &K) -> Result<Option<V>> {
        match self.in_memory.load(key) {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(err) => debug!(error = %err, "In-memory tier failed, falling back"),
        }

        let Some(value) = self.persistent.load(key)? else {
            return Ok(None);
        };

        if let Err(err) = self.in_memory.store(key.clone(), value.clone()) {
            warn!(error = %err, "Failed to backfill in-memory tier");
        }
        Ok(Some(value))
    }

    // == Store ==
    /// Persistent first. On failure memory is left untouched so the tiers
    /// never diverge.
    fn store(&self, key: K, value: V) -> Result<()> {
        self.persistent.store(key.clone(), value.clone())?;

        if let Err(err) = self.in_memory.store(key, value) {
            warn!(error = %err, "Failed to mirror store into in-memory tier");
        }
        Ok(())
    }

    // == Delete ==
    fn delete(&self, key: &K) -> Result<()> {
        self.persistent.delete(key)?;

        if let Err(err) = self.in_memory.delete(key) {
            warn!(error = %err, "Failed to mirror delete into in-memory tier");
        }
        Ok(())
    }

    /// Authoritative key set, from the persistent tier.
    fn keys(&self) -> Result<Vec<K>> {
        self.persistent.keys()
    }
}
