//! Frequency buckets.
//!
//! A [`FrequencyBucket`] is a doubly-linked list of every cache entry that
//! currently shares one access count. The list does not own its nodes: nodes
//! live in the segment's [`NodeArena`] and the bucket only records the head and
//! tail handles, while each [`Node`] carries its own `prev`/`next` handles.
//!
//! ```text
//!   freq = 3:  head ──► [n4] ◄──► [n9] ◄──► [n2] ◄── tail
//!                       oldest                newest
//!                       (evicted first)
//! ```
//!
//! Appending always goes to the tail, so the head is the entry that has been
//! sitting at this frequency the longest. That gives FIFO tie-breaking among
//! entries with equal frequency.

use crate::arena::{NodeArena, NodeId};

/// A cache entry as stored in the arena.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Number of accesses including the insert. Always >= 1.
    pub(crate) frequency: u64,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    /// Creates a detached node with frequency 1.
    pub(crate) fn new(key: K, value: V) -> Self {
        Node {
            key,
            value,
            frequency: 1,
            prev: None,
            next: None,
        }
    }
}

/// Insertion-ordered list of the nodes sharing one frequency.
#[derive(Debug)]
pub(crate) struct FrequencyBucket {
    frequency: u64,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl FrequencyBucket {
    pub(crate) fn new(frequency: u64) -> Self {
        FrequencyBucket {
            frequency,
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn frequency(&self) -> u64 {
        self.frequency
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The oldest node at this frequency, i.e. the eviction candidate.
    #[inline]
    pub(crate) fn first(&self) -> Option<NodeId> {
        self.head
    }

    /// Returns `true` if `id` is currently linked into this bucket.
    fn is_linked<K, V>(&self, arena: &NodeArena<Node<K, V>>, id: NodeId) -> bool {
        match arena.get(id) {
            Some(node) => node.prev.is_some() || self.head == Some(id),
            None => false,
        }
    }

    /// Links `id` in at the tail. Vacant handles are ignored.
    pub(crate) fn append<K, V>(&mut self, arena: &mut NodeArena<Node<K, V>>, id: NodeId) {
        let old_tail = self.tail;
        match arena.get_mut(id) {
            Some(node) => {
                debug_assert_eq!(node.frequency, self.frequency);
                debug_assert!(node.prev.is_none() && node.next.is_none());
                node.prev = old_tail;
                node.next = None;
            }
            None => return,
        }

        match old_tail.and_then(|t| arena.get_mut(t)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Unlinks `id` from wherever it sits in this bucket.
    ///
    /// Removing a node that is not linked here is a no-op and returns `false`,
    /// so a detach can safely be repeated.
    pub(crate) fn remove<K, V>(&mut self, arena: &mut NodeArena<Node<K, V>>, id: NodeId) -> bool {
        if !self.is_linked(arena, id) {
            return false;
        }

        let (prev, next) = match arena.get_mut(id) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return false,
        };

        match prev.and_then(|p| arena.get_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| arena.get_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        true
    }

    /// Handles from oldest to newest.
    pub(crate) fn iter<'a, K, V>(
        &self,
        arena: &'a NodeArena<Node<K, V>>,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let mut cursor = self.head;
        core::iter::from_fn(move || {
            let id = cursor?;
            cursor = arena.get(id).and_then(|node| node.next);
            Some(id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena_with(keys: &[&'static str]) -> (NodeArena<Node<&'static str, u32>>, Vec<NodeId>) {
        let mut arena = NodeArena::with_capacity(keys.len());
        let ids = keys
            .iter()
            .enumerate()
            .map(|(i, k)| arena.insert(Node::new(*k, i as u32)))
            .collect();
        (arena, ids)
    }

    fn keys(
        bucket: &FrequencyBucket,
        arena: &NodeArena<Node<&'static str, u32>>,
    ) -> Vec<&'static str> {
        bucket
            .iter(arena)
            .map(|id| arena.get(id).unwrap().key)
            .collect()
    }

    #[test]
    fn test_append_keeps_arrival_order() {
        let (mut arena, ids) = arena_with(&["a", "b", "c"]);
        let mut bucket = FrequencyBucket::new(1);
        assert!(bucket.is_empty());
        assert_eq!(bucket.first(), None);

        for &id in &ids {
            bucket.append(&mut arena, id);
        }

        assert_eq!(bucket.len(), 3);
        assert_eq!(bucket.first(), Some(ids[0]));
        assert_eq!(keys(&bucket, &arena), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let (mut arena, ids) = arena_with(&["a", "b", "c", "d"]);
        let mut bucket = FrequencyBucket::new(1);
        for &id in &ids {
            bucket.append(&mut arena, id);
        }

        assert!(bucket.remove(&mut arena, ids[1]));
        assert_eq!(keys(&bucket, &arena), vec!["a", "c", "d"]);

        assert!(bucket.remove(&mut arena, ids[0]));
        assert_eq!(bucket.first(), Some(ids[2]));
        assert_eq!(keys(&bucket, &arena), vec!["c", "d"]);

        assert!(bucket.remove(&mut arena, ids[3]));
        assert_eq!(keys(&bucket, &arena), vec!["c"]);

        assert!(bucket.remove(&mut arena, ids[2]));
        assert!(bucket.is_empty());
        assert_eq!(bucket.first(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut arena, ids) = arena_with(&["a", "b"]);
        let mut bucket = FrequencyBucket::new(1);
        bucket.append(&mut arena, ids[0]);
        bucket.append(&mut arena, ids[1]);

        assert!(bucket.remove(&mut arena, ids[0]));
        assert!(!bucket.remove(&mut arena, ids[0]));
        assert_eq!(bucket.len(), 1);
        assert_eq!(keys(&bucket, &arena), vec!["b"]);

        assert!(bucket.remove(&mut arena, ids[1]));
        assert!(!bucket.remove(&mut arena, ids[1]));
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_vacant_handles_are_ignored() {
        let (mut arena, ids) = arena_with(&["a", "b"]);
        let mut bucket = FrequencyBucket::new(1);
        bucket.append(&mut arena, ids[0]);

        arena.remove(ids[1]);
        bucket.append(&mut arena, ids[1]);
        assert_eq!(bucket.len(), 1);
        assert!(!bucket.remove(&mut arena, ids[1]));
        assert_eq!(keys(&bucket, &arena), vec!["a"]);
    }

    #[test]
    fn test_reappend_after_remove_moves_to_tail() {
        let (mut arena, ids) = arena_with(&["a", "b", "c"]);
        let mut bucket = FrequencyBucket::new(1);
        for &id in &ids {
            bucket.append(&mut arena, id);
        }

        bucket.remove(&mut arena, ids[0]);
        bucket.append(&mut arena, ids[0]);
        assert_eq!(keys(&bucket, &arena), vec!["b", "c", "a"]);
        assert_eq!(bucket.frequency(), 1);
    }
}
