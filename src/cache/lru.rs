//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::HashMap;
use std::hash::Hash;

// == Node ==
#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// A doubly linked list threaded through a slab of nodes, indexed by key:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// `touch`, `remove` and `evict_oldest` are all O(1).
#[derive(Debug)]
pub struct LruTracker<K> {
    nodes: Vec<Option<Node<K>>>,
    index: HashMap<K, usize>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }
}

impl<K: Hash + Eq + Clone> LruTracker<K> {
    // == Constructor ==
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to head), inserting it if new.
    pub fn touch(&mut self, key: &K) {
        if let Some(&slot) = self.index.get(key) {
            self.unlink(slot);
            self.push_front(slot);
            return;
        }

        let node = Node {
            key: key.clone(),
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.index.insert(key.clone(), slot);
        self.push_front(slot);
    }

    // == Remove ==
    /// Removes a key from the tracker. Returns whether it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.unlink(slot);
                self.nodes[slot] = None;
                self.free.push(slot);
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let slot = self.tail?;
        let key = self.nodes[slot].as_ref()?.key.clone();
        self.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    #[cfg(test)]
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.tail
            .and_then(|slot| self.nodes[slot].as_ref())
            .map(|node| &node.key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = match self.nodes[slot].as_mut() {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.nodes[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[slot].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            if let Some(node) = self.nodes[h].as_mut() {
                node.prev = Some(slot);
            }
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(keys: &[&str]) -> LruTracker<String> {
        let mut lru = LruTracker::new();
        for key in keys {
            lru.touch(&key.to_string());
        }
        lru
    }

    fn s(key: &str) -> String {
        key.to_string()
    }

    #[test]
    fn test_lru_new() {
        let lru: LruTracker<String> = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.peek_oldest(), None);
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = tracker(&["key1", "key2", "key3"]);

        lru.touch(&s("key1"));

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some(&s("key2")));
    }

    #[test]
    fn test_lru_evict_in_order() {
        let mut lru = tracker(&["a", "b", "c"]);

        // touch order leaves head=[b, c, a]=tail
        lru.touch(&s("a"));
        lru.touch(&s("c"));
        lru.touch(&s("b"));

        assert_eq!(lru.evict_oldest(), Some(s("a")));
        assert_eq!(lru.evict_oldest(), Some(s("c")));
        assert_eq!(lru.evict_oldest(), Some(s("b")));
        assert_eq!(lru.evict_oldest(), None);
        assert!(lru.is_empty());
    }

    #[test]
    fn test_lru_remove_middle_keeps_links() {
        let mut lru = tracker(&["key1", "key2", "key3"]);

        assert!(lru.remove(&s("key2")));
        assert!(!lru.remove(&s("key2")));

        assert_eq!(lru.len(), 2);
        assert!(!lru.contains(&s("key2")));
        assert_eq!(lru.evict_oldest(), Some(s("key1")));
        assert_eq!(lru.evict_oldest(), Some(s("key3")));
    }

    #[test]
    fn test_lru_remove_head_and_tail() {
        let mut lru = tracker(&["a", "b", "c"]);

        lru.remove(&s("c"));
        lru.remove(&s("a"));

        assert_eq!(lru.peek_oldest(), Some(&s("b")));
        lru.touch(&s("d"));
        assert_eq!(lru.evict_oldest(), Some(s("b")));
        assert_eq!(lru.evict_oldest(), Some(s("d")));
    }

    #[test]
    fn test_lru_reuses_freed_slots() {
        let mut lru = tracker(&["a", "b"]);
        lru.remove(&s("a"));
        lru.touch(&s("c"));

        assert_eq!(lru.nodes.len(), 2);
        assert_eq!(lru.evict_oldest(), Some(s("b")));
        assert_eq!(lru.evict_oldest(), Some(s("c")));
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = tracker(&["key1", "key1", "key1"]);

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.evict_oldest(), Some(s("key1")));
        assert!(lru.is_empty());
    }
}
