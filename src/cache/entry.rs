//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use crate::cache::dispatch::Timer;
use crate::cache::list::NodeId;

// == Cache Entry ==
/// A stored value plus its ordering handle and expiration metadata.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Handle into the collection; only the collection interprets it
    pub(crate) node: NodeId,
    /// Absolute deadline, None = no expiration
    pub expires_at: Option<Instant>,
    /// Pending expiry callback, if one was registered
    pub(crate) timer: Option<Timer>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `node` - Handle returned by the collection's push
    /// * `ttl` - Optional TTL; zero, or a TTL whose deadline is not
    ///   representable, is treated as no expiration
    pub(crate) fn new(value: V, node: NodeId, ttl: Option<Duration>) -> Self {
        let expires_at = ttl
            .filter(|ttl| !ttl.is_zero())
            .and_then(|ttl| Instant::now().checked_add(ttl));

        Self {
            value,
            node,
            expires_at,
            timer: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired only once the current instant is strictly past
    /// its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the deadline has passed
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }

    // == Stop Timer ==
    /// Cancels a pending expiry callback.
    pub(crate) fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::list::OrderList;
    use std::thread::sleep;

    fn node() -> NodeId {
        OrderList::new().push_back(())
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value", node(), None);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining().is_none());
    }

    #[test]
    fn test_entry_zero_ttl_never_expires() {
        let entry = CacheEntry::new(1, node(), Some(Duration::ZERO));
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn test_entry_unrepresentable_ttl_never_expires() {
        let entry = CacheEntry::new(1, node(), Some(Duration::MAX));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value", node(), Some(Duration::from_millis(30)));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(50));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("test_value", node(), Some(Duration::from_secs(10)));

        let remaining = entry.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("test", node(), None);
        entry.expires_at = Some(now);

        // Exactly at the deadline the entry is still live
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::from_nanos(1)));
    }
}
