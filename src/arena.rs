//! Slot arena backing the frequency bucket lists.
//!
//! Nodes live in a `Vec` of optional slots and are addressed by [`NodeId`].
//! Freed slots go on a free list and are handed out again by the next insert,
//! so a handle stays valid exactly as long as the node it names is live.
//! Links between nodes are plain `NodeId`s, never owning pointers, which keeps
//! the doubly-linked bucket lists free of ownership cycles: the arena is the
//! only owner and reclaims nodes explicitly on removal or clear.

/// Stable handle to a node stored in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Arena of nodes with free-list slot reuse.
#[derive(Debug)]
pub(crate) struct NodeArena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> NodeArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        NodeArena {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` and returns its handle, reusing a vacant slot if one exists.
    pub(crate) fn insert(&mut self, value: T) -> NodeId {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(value);
                idx
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        };
        self.len += 1;
        NodeId(idx)
    }

    /// Takes the node out of its slot. Returns `None` if the slot is vacant.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(value)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Drops every node and releases the slot storage.
    pub(crate) fn clear(&mut self) {
        self.slots = Vec::new();
        self.free = Vec::new();
        self.len = 0;
    }

    /// Handles of all live nodes, in slot order.
    #[cfg(test)]
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| NodeId(idx)))
    }
}
