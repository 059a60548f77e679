//! Collection Module
//!
//! Replacement policies expressed as orderings over an [`OrderList`].
//!
//! | Policy | push        | touch         | oldest |
//! |--------|-------------|---------------|--------|
//! | LRU    | front       | move to front | back   |
//! | FIFO   | back        | no-op         | front  |

use crate::cache::list::{NodeId, OrderList};

// == Collection Trait ==
/// Ordering structure that decides which entry is evicted next.
///
/// The container stores the `NodeId` returned by `push` on the entry and
/// never interprets it; only the collection reads it back.
pub trait Collection<K>: Send + Sync {
    /// Inserts a key at the policy-defined insertion point.
    fn push(&mut self, key: K) -> NodeId;

    /// Repositions an existing node in response to an access.
    fn touch(&mut self, id: NodeId);

    /// Unlinks a node, returning its key.
    fn remove(&mut self, id: NodeId) -> Option<K>;

    /// Next eviction candidate under capacity pressure.
    fn oldest(&self) -> Option<NodeId>;

    /// Key stored at a node.
    fn key(&self, id: NodeId) -> Option<&K>;

    /// Keys from oldest to newest.
    fn keys(&self) -> Vec<K>
    where
        K: Clone;

    fn len(&self) -> usize;

    /// Drops every node.
    fn init(&mut self);
}

// == LRU ==
/// Recency ordering: front is most recently used, back is evicted first.
#[derive(Debug)]
pub struct LruOrder<K> {
    list: OrderList<K>,
}

impl<K> LruOrder<K> {
    pub fn new() -> Self {
        Self {
            list: OrderList::new(),
        }
    }
}

impl<K> Default for LruOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Send + Sync> Collection<K> for LruOrder<K> {
    fn push(&mut self, key: K) -> NodeId {
        self.list.push_front(key)
    }

    fn touch(&mut self, id: NodeId) {
        self.list.move_to_front(id);
    }

    fn remove(&mut self, id: NodeId) -> Option<K> {
        self.list.remove(id)
    }

    fn oldest(&self) -> Option<NodeId> {
        self.list.back()
    }

    fn key(&self, id: NodeId) -> Option<&K> {
        self.list.get(id)
    }

    fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys: Vec<K> = self.list.iter().cloned().collect();
        keys.reverse();
        keys
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn init(&mut self) {
        self.list.clear();
    }
}

// == FIFO ==
/// Insertion ordering: front was inserted first and is evicted first.
#[derive(Debug)]
pub struct FifoOrder<K> {
    list: OrderList<K>,
}

impl<K> FifoOrder<K> {
    pub fn new() -> Self {
        Self {
            list: OrderList::new(),
        }
    }
}

impl<K> Default for FifoOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Send + Sync> Collection<K> for FifoOrder<K> {
    fn push(&mut self, key: K) -> NodeId {
        self.list.push_back(key)
    }

    // Access never reorders a FIFO.
    fn touch(&mut self, _id: NodeId) {}

    fn remove(&mut self, id: NodeId) -> Option<K> {
        self.list.remove(id)
    }

    fn oldest(&self) -> Option<NodeId> {
        self.list.front()
    }

    fn key(&self, id: NodeId) -> Option<&K> {
        self.list.get(id)
    }

    fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.list.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.list.len()
    }

    fn init(&mut self) {
        self.list.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn oldest_key<C: Collection<&'static str>>(c: &C) -> Option<&'static str> {
        c.oldest().and_then(|id| c.key(id)).copied()
    }

    #[test]
    fn test_lru_oldest_is_least_recently_touched() {
        let mut lru = LruOrder::new();
        let a = lru.push("a");
        lru.push("b");
        lru.push("c");

        assert_eq!(oldest_key(&lru), Some("a"));

        lru.touch(a);
        assert_eq!(oldest_key(&lru), Some("b"));
        assert_eq!(lru.keys(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_fifo_touch_is_noop() {
        let mut fifo = FifoOrder::new();
        let a = fifo.push("a");
        fifo.push("b");

        fifo.touch(a);
        assert_eq!(oldest_key(&fifo), Some("a"));
        assert_eq!(fifo.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_collection_remove_and_init() {
        let mut lru = LruOrder::new();
        let a = lru.push("a");
        lru.push("b");

        assert_eq!(lru.remove(a), Some("a"));
        assert_eq!(lru.len(), 1);
        assert_eq!(oldest_key(&lru), Some("b"));

        lru.init();
        assert_eq!(lru.len(), 0);
        assert_eq!(lru.oldest(), None);
    }
}
