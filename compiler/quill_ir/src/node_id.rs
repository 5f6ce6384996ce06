//! Node handles for the tree arena.

use std::fmt;

/// Index into the node arena of a [`Tree`](crate::Tree).
///
/// # Design
/// Nodes never own each other. Parent links, child lists, annotation lists
/// and name dictionaries all store `NodeId`s, so relinking a node is an
/// integer write instead of a pointer dance.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for "no node" (detached parent, missing child).
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Create a new `NodeId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True unless this is [`NodeId::NONE`].
    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    /// True if this is [`NodeId::NONE`].
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_some() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::NONE")
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::NONE
    }
}
