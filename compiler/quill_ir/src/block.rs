//! Statement blocks.
//!
//! A [`Block`] is the body of its owner node: the child list, the brace
//! state, the annotations hung on the delimiters, and a name dictionary for
//! the declarations and labels directly inside it.
//!
//! Children's parent is the block's *owner*; the block itself is never a
//! parent. The format state reuses the node layout: the newline count is the
//! line breaks before `{` (or before the first child when braceless) and
//! the alternate count is the line breaks before `}`.

use crate::collection::ChildList;
use crate::dictionary::NameDictionary;
use crate::format::{FormatFlags, FormatState};
use crate::node_id::NodeId;

/// Most line breaks kept before a closing brace (one blank line).
pub const MAX_END_NEWLINES: u8 = 2;

/// How a block's braces are managed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BracePolicy {
    /// Always braced (types, methods, namespaces, `switch`, `try`).
    Required,
    /// Braces may be dropped around a single statement and are added back
    /// when a second statement arrives (`if`, `else`, loops).
    Optional,
    /// Never braced by the engine, may hold any number of statements
    /// (`case` sections).
    Implicit,
    /// No delimiters at all (the compilation unit).
    Never,
}

/// A statement block.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Block {
    pub(crate) children: ChildList,
    pub(crate) format: FormatState,
    pub(crate) empty_statement: bool,
    /// Comments and directives on the delimiters: prefix entries sit
    /// between the header and `{`, EOL entries follow `{` (or the single
    /// statement of a braceless body), postfix entries follow `}`.
    pub(crate) annotations: Vec<NodeId>,
    pub(crate) dictionary: NameDictionary,
}

impl Block {
    /// Empty braced block owned by `owner`.
    pub fn braced(owner: NodeId) -> Self {
        let mut block = Self::unbraced(owner);
        block.format.insert(FormatFlags::HAS_GROUPING);
        block.format.set_default_newlines(1);
        block.format.set_end_newlines(1);
        block
    }

    /// Empty braceless block owned by `owner`.
    pub fn unbraced(owner: NodeId) -> Self {
        Block {
            children: ChildList::new(owner),
            ..Block::default()
        }
    }

    #[inline]
    pub fn owner(&self) -> NodeId {
        self.children.parent()
    }

    #[inline]
    pub fn children(&self) -> &ChildList {
        &self.children
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn has_braces(&self) -> bool {
        self.format.contains(FormatFlags::HAS_GROUPING)
    }

    /// Body is a lone `;` (`while (x);`).
    #[inline]
    pub fn is_empty_statement(&self) -> bool {
        self.empty_statement
    }

    #[inline]
    pub fn format(&self) -> FormatState {
        self.format
    }

    #[inline]
    pub fn format_mut(&mut self) -> &mut FormatState {
        &mut self.format
    }

    /// Line breaks before `{` (or before the only statement when braceless).
    #[inline]
    pub fn newlines(&self) -> u8 {
        self.format.newlines()
    }

    /// Line breaks before `}`.
    #[inline]
    pub fn end_newlines(&self) -> u8 {
        self.format.end_newlines()
    }

    #[inline]
    pub fn annotations(&self) -> &[NodeId] {
        &self.annotations
    }

    #[inline]
    pub fn dictionary(&self) -> &NameDictionary {
        &self.dictionary
    }

    pub fn set_braces(&mut self, braces: bool) {
        self.format.set(FormatFlags::HAS_GROUPING, braces);
    }

    pub fn set_empty_statement(&mut self, empty: bool) {
        self.empty_statement = empty;
    }

    /// Append a child whose parent link the caller has already set.
    pub fn push_parsed(&mut self, child: NodeId) {
        self.children.push_raw(child);
    }

    /// Insert a child whose parent link the caller has already set.
    pub fn insert_parsed(&mut self, index: usize, child: NodeId) {
        self.children.insert_raw(index, child);
    }

    /// Remove the child at `index` without touching its parent link.
    pub fn take_parsed(&mut self, index: usize) -> Option<NodeId> {
        (index < self.children.len()).then(|| self.children.take_at(index))
    }

    pub fn clamp_end_newlines(&mut self, max: u8) {
        if self.format.end_newlines() > max {
            self.format.set_end_newlines(u32::from(max));
        }
    }

    pub(crate) fn map_children(&mut self, f: &mut dyn FnMut(NodeId) -> NodeId) {
        self.children.map_ids(f);
        for ann in &mut self.annotations {
            *ann = f(*ann);
        }
    }
}
