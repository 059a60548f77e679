//! Ordering List Module
//!
//! Doubly linked list whose nodes live in a flat slot arena and link to each
//! other by index. Handles (`NodeId`) stay valid until the node is removed,
//! which lets the container keep one per entry and move or unlink it in O(1).
//!
//! ```text
//!   slots: [ Some{key: a, prev: -, next: 2} | None | Some{key: b, prev: 0, next: -} ]
//!   free:  [1]
//!   head ─► 0 ◄──► 2 ◄── tail
//! ```

// == Node Handle ==
/// Stable handle to a node in an [`OrderList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

// == Order List ==
/// Arena-backed doubly linked list of keys.
///
/// Front and back carry no meaning of their own; the collection using the
/// list decides which end holds the next eviction candidate.
#[derive(Debug)]
pub struct OrderList<K> {
    slots: Vec<Option<Node<K>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<K> OrderList<K> {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn front(&self) -> Option<NodeId> {
        self.head
    }

    pub fn back(&self) -> Option<NodeId> {
        self.tail
    }

    // == Get ==
    /// Returns the key stored at `id`, if the node is live.
    pub fn get(&self, id: NodeId) -> Option<&K> {
        self.node(id).map(|node| &node.key)
    }

    // == Push Front ==
    /// Inserts `key` at the front and returns its handle.
    pub fn push_front(&mut self, key: K) -> NodeId {
        let id = self.alloc(Node {
            key,
            prev: None,
            next: None,
        });
        self.link_front(id);
        id
    }

    // == Push Back ==
    /// Inserts `key` at the back and returns its handle.
    pub fn push_back(&mut self, key: K) -> NodeId {
        let id = self.alloc(Node {
            key,
            prev: None,
            next: None,
        });
        self.link_back(id);
        id
    }

    // == Move To Front ==
    /// Moves a live node to the front. Returns false for stale handles.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }
        self.unlink(id);
        self.link_front(id);
        true
    }

    // == Remove ==
    /// Unlinks a node and frees its slot, returning the key.
    pub fn remove(&mut self, id: NodeId) -> Option<K> {
        self.node(id)?;
        self.unlink(id);
        let node = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.key)
    }

    // == Clear ==
    /// Drops every node and resets the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iterate ==
    /// Iterates keys from front to back.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<K>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn alloc(&mut self, node: Node<K>) -> NodeId {
        self.len += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(node);
            NodeId(idx)
        } else {
            self.slots.push(Some(node));
            NodeId(self.slots.len() - 1)
        }
    }

    fn link_front(&mut self, id: NodeId) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(node) = self.node_mut(head) {
                    node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn link_back(&mut self, id: NodeId) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(id) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => {
                if let Some(node) = self.node_mut(tail) {
                    node.next = Some(id);
                }
            }
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    fn unlink(&mut self, id: NodeId) {
        let (prev, next) = match self.node(id) {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        match prev {
            Some(prev) => {
                if let Some(node) = self.node_mut(prev) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = self.node_mut(next) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
    }
}

impl<K> Default for OrderList<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back key iterator.
pub struct Iter<'a, K> {
    list: &'a OrderList<K>,
    current: Option<NodeId>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.current?)?;
        self.current = node.next;
        Some(&node.key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &OrderList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_list_new() {
        let list: OrderList<u32> = OrderList::new();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_list_push_front_and_back() {
        let mut list = OrderList::new();
        list.push_back("b");
        list.push_front("a");
        list.push_back("c");

        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list), vec!["a", "b", "c"]);
        assert_eq!(list.get(list.front().unwrap()), Some(&"a"));
        assert_eq!(list.get(list.back().unwrap()), Some(&"c"));
    }

    #[test]
    fn test_list_move_to_front() {
        let mut list = OrderList::new();
        let a = list.push_back("a");
        list.push_back("b");
        let c = list.push_back("c");

        assert!(list.move_to_front(c));
        assert_eq!(keys(&list), vec!["c", "a", "b"]);

        // Moving the head is a no-op
        assert!(list.move_to_front(c));
        assert_eq!(keys(&list), vec!["c", "a", "b"]);

        assert!(list.move_to_front(a));
        assert_eq!(keys(&list), vec!["a", "c", "b"]);
        assert_eq!(list.get(list.back().unwrap()), Some(&"b"));
    }

    #[test]
    fn test_list_remove_middle_and_ends() {
        let mut list = OrderList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(keys(&list), vec!["a", "c"]);

        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.remove(c), Some("c"));
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_list_stale_handle() {
        let mut list = OrderList::new();
        let a = list.push_back("a");
        list.remove(a);

        assert_eq!(list.remove(a), None);
        assert!(!list.move_to_front(a));
        assert_eq!(list.get(a), None);
    }

    #[test]
    fn test_list_slot_reuse() {
        let mut list = OrderList::new();
        let a = list.push_back("a");
        list.push_back("b");
        list.remove(a);

        let c = list.push_front("c");
        assert_eq!(a, c);
        assert_eq!(keys(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_list_clear() {
        let mut list = OrderList::new();
        list.push_back(1);
        list.push_back(2);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
    }
}
