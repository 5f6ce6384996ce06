//! Parent-aware child lists.
//!
//! A [`ChildList`] knows the node its items belong to. Adding an item that
//! is still attached to another live parent adopts a deep clone instead, so a
//! node is never reachable from two places.

use crate::node_id::NodeId;
use crate::tree::Tree;

/// Ordered children of one owner.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ChildList {
    parent: NodeId,
    items: Vec<NodeId>,
}

impl ChildList {
    pub fn new(parent: NodeId) -> Self {
        ChildList {
            parent,
            items: Vec::new(),
        }
    }

    /// The node every item reports as its parent.
    #[inline]
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).copied()
    }

    #[inline]
    pub fn first(&self) -> Option<NodeId> {
        self.items.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<NodeId> {
        self.items.last().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.items
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.items.iter().copied()
    }

    pub fn position(&self, item: NodeId) -> Option<usize> {
        self.items.iter().position(|&i| i == item)
    }

    /// The id to store for `item`: a clone if it is already in this list
    /// or belongs to another live parent.
    fn claim(&self, tree: &mut Tree, item: NodeId) -> NodeId {
        let item = if self.items.contains(&item) {
            tree.deep_clone(item)
        } else {
            item
        };
        tree.adopt(item, self.parent)
    }

    /// Append `item`, adopting a clone if it belongs to another live parent
    /// or is already in the list. Returns the id actually stored.
    pub fn add(&mut self, tree: &mut Tree, item: NodeId) -> NodeId {
        let item = self.claim(tree, item);
        self.items.push(item);
        item
    }

    /// Insert at `index` (clamped to the length).
    pub fn insert(&mut self, tree: &mut Tree, index: usize, item: NodeId) -> NodeId {
        let item = self.claim(tree, item);
        self.items.insert(index.min(self.items.len()), item);
        item
    }

    /// Remove the item at `index` and detach it.
    pub fn remove_at(&mut self, tree: &mut Tree, index: usize) -> Option<NodeId> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        tree.detach(item);
        Some(item)
    }

    /// Remove `item` if present.
    pub fn remove(&mut self, tree: &mut Tree, item: NodeId) -> bool {
        match self.position(item) {
            Some(index) => self.remove_at(tree, index).is_some(),
            None => false,
        }
    }

    /// Replace the item at `index`. Returns the detached old item; an item
    /// replaced by itself stays in place and is returned as is.
    pub fn replace(&mut self, tree: &mut Tree, index: usize, item: NodeId) -> Option<NodeId> {
        if index >= self.items.len() {
            return None;
        }
        if self.items[index] == item {
            return Some(item);
        }
        let item = self.claim(tree, item);
        let old = std::mem::replace(&mut self.items[index], item);
        tree.detach(old);
        Some(old)
    }

    /// Detach and drop every item.
    pub fn clear(&mut self, tree: &mut Tree) {
        for item in self.items.drain(..) {
            tree.detach(item);
        }
    }

    /// Re-parent the list and every item in it.
    pub fn set_parent(&mut self, tree: &mut Tree, parent: NodeId) {
        self.parent = parent;
        for &item in &self.items {
            tree.set_parent(item, parent);
        }
    }

    /// True if no item after the first starts its own line.
    pub fn is_single_line(&self, tree: &Tree) -> bool {
        self.items
            .iter()
            .skip(1)
            .all(|&item| tree.get(item).newlines() == 0)
    }

    /// Put every item on one line, or restore default line breaks.
    pub fn set_single_line(&self, tree: &mut Tree, single_line: bool) {
        for (i, &item) in self.items.iter().enumerate() {
            if single_line {
                if i > 0 {
                    tree.set_newlines(item, 0);
                }
            } else {
                tree.reset_newlines(item);
            }
        }
    }

    /// Append without adoption checks; the caller has set the parent.
    pub(crate) fn push_raw(&mut self, item: NodeId) {
        self.items.push(item);
    }

    pub(crate) fn insert_raw(&mut self, index: usize, item: NodeId) {
        self.items.insert(index.min(self.items.len()), item);
    }

    /// Remove by index without touching the item's parent link.
    pub(crate) fn take_at(&mut self, index: usize) -> NodeId {
        self.items.remove(index)
    }

    pub(crate) fn map_ids(&mut self, f: &mut dyn FnMut(NodeId) -> NodeId) {
        for item in &mut self.items {
            *item = f(*item);
        }
    }

    pub(crate) fn set_parent_id(&mut self, parent: NodeId) {
        self.parent = parent;
    }
}
