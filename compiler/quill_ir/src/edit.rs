//! Block mutation and brace normalization.
//!
//! [`BlockEditor`] is the post-parse editing surface for a block. Every edit
//! keeps the block's name dictionary in sync, and any edit that leaves the
//! block with two or fewer children re-runs [`Tree::reformat_block`], since
//! the brace decision flips at exactly zero, one and two statements.

use crate::block::{BracePolicy, MAX_END_NEWLINES};
use crate::format::FormatFlags;
use crate::node::NodeKind;
use crate::node_id::NodeId;
use crate::tree::Tree;

/// Editing handle for the block owned by one node.
pub struct BlockEditor<'t> {
    tree: &'t mut Tree,
    owner: NodeId,
}

impl Tree {
    /// Editor for `owner`'s block, or `None` if it has no block.
    pub fn edit_block(&mut self, owner: NodeId) -> Option<BlockEditor<'_>> {
        self.block(owner)?;
        Some(BlockEditor { tree: self, owner })
    }

    /// Apply `owner`'s brace policy to its block.
    ///
    /// - A braceless block with more than one child gets braces.
    /// - With cleanup enabled, an optional-brace block holding one plain
    ///   statement loses its braces, unless the braces were set explicitly.
    ///   An `else` that shared the closing brace's line moves to its own line.
    /// - With cleanup enabled, an empty braced block keeps no blank lines.
    /// - Line breaks before `}` are clamped to one blank line.
    pub fn reformat_block(&mut self, owner: NodeId) {
        let policy = self.brace_policy(owner);
        let cleanup = self.settings().auto_cleanup && !self.is_generated();
        let strippable = cleanup && policy == BracePolicy::Optional && self.can_strip_braces(owner);

        let stripped = self.with_block(owner, |tree, block| {
            let count = block.len();
            let mut stripped = false;
            match policy {
                BracePolicy::Required => {
                    if !block.has_braces() {
                        tracing::debug!(?owner, "reformat: restoring required braces");
                        add_braces(tree, block);
                    }
                }
                BracePolicy::Optional => {
                    if !block.has_braces() && count > 1 {
                        tracing::debug!(?owner, count, "reformat: adding braces");
                        add_braces(tree, block);
                    } else if block.has_braces()
                        && count == 1
                        && strippable
                        && !block.format().contains(FormatFlags::GROUPING_SET)
                        && block.annotations().is_empty()
                    {
                        tracing::debug!(?owner, "reformat: stripping braces");
                        block.set_braces(false);
                        block.format.set_end_newlines(0);
                        if let Some(child) = block.children().first() {
                            let newlines = tree.get(child).newlines().max(1);
                            tree.set_newlines(child, u32::from(newlines));
                            block.format.set_newlines(u32::from(newlines));
                        }
                        stripped = true;
                    } else if block.has_braces() && count == 0 && cleanup {
                        block.clamp_end_newlines(1);
                    }
                }
                BracePolicy::Implicit | BracePolicy::Never => {}
            }
            if policy != BracePolicy::Never {
                block.clamp_end_newlines(MAX_END_NEWLINES);
            }
            stripped
        });

        if stripped == Some(true) {
            let else_clause = match self.kind(owner) {
                NodeKind::If(stmt) => stmt.else_clause,
                _ => None,
            };
            if let Some(else_clause) = else_clause {
                if self.get(else_clause).newlines() == 0 {
                    self.set_newlines(else_clause, 1);
                }
            }
        }
    }

    /// The single child of `owner`'s block may stand without braces.
    fn can_strip_braces(&self, owner: NodeId) -> bool {
        let children = self.children(owner);
        let [child] = children else {
            return false;
        };
        let child_kind = self.kind(*child);
        if !child_kind.is_statement()
            || child_kind.is_declaration()
            || matches!(child_kind, NodeKind::Label(_) | NodeKind::Empty)
        {
            return false;
        }
        // Dropping the braces around an `if` would hand it our `else`.
        if let (NodeKind::If(outer), NodeKind::If(_)) = (self.kind(owner), child_kind) {
            if outer.else_clause.is_some() {
                return false;
            }
        }
        true
    }
}

fn add_braces(tree: &mut Tree, block: &mut crate::block::Block) {
    block.set_braces(true);
    block.set_empty_statement(false);
    block.format.set_default_newlines(1);
    if block.end_newlines() == 0 {
        block.format.set_end_newlines(1);
    }
    let children: Vec<NodeId> = block.children().iter().collect();
    for child in children {
        if tree.get(child).newlines() == 0 {
            tree.set_newlines(child, 1);
        }
    }
}

impl BlockEditor<'_> {
    #[inline]
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    #[inline]
    pub fn tree(&mut self) -> &mut Tree {
        &mut *self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.children(self.owner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `child`. Returns the id stored (a clone if `child` belonged
    /// to another live parent).
    pub fn add(&mut self, child: NodeId) -> NodeId {
        let stored = self.store(None, child);
        self.after_edit();
        stored
    }

    /// Append several children, reformatting once at the end.
    pub fn add_range(&mut self, children: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let stored: Vec<NodeId> = children.into_iter().map(|c| self.store(None, c)).collect();
        self.after_edit();
        stored
    }

    /// Insert `child` at `index`.
    pub fn insert(&mut self, index: usize, child: NodeId) -> NodeId {
        let stored = self.store(Some(index), child);
        self.after_edit();
        stored
    }

    /// Remove `child`. Returns whether it was present.
    pub fn remove(&mut self, child: NodeId) -> bool {
        let Some(index) = self.tree.children(self.owner).iter().position(|&c| c == child) else {
            return false;
        };
        self.remove_at(index).is_some()
    }

    /// Remove and detach the child at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<NodeId> {
        let removed = self
            .tree
            .with_block(self.owner, |tree, block| {
                let child = block.children().get(index)?;
                tree.unregister_name(block, child);
                block.children.remove_at(tree, index)
            })
            .flatten();
        if removed.is_some() {
            self.after_edit();
        }
        removed
    }

    /// Replace `old` with `new`. Returns the id stored for `new`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Option<NodeId> {
        let stored = self
            .tree
            .with_block(self.owner, |tree, block| {
                let index = block.children().position(old)?;
                tree.unregister_name(block, old);
                block.children.replace(tree, index, new)?;
                let stored = block.children().get(index)?;
                mark_statement(tree, stored);
                tree.register_name(block, stored);
                Some(stored)
            })
            .flatten();
        if stored.is_some() {
            self.after_edit();
        }
        stored
    }

    /// Remove every child.
    pub fn clear(&mut self) {
        self.tree.with_block(self.owner, |tree, block| {
            block.dictionary.clear();
            block.children.clear(tree);
        });
        self.after_edit();
    }

    /// Set braces explicitly. Removing braces from a block with more than
    /// one child is refused; returns whether the request was applied.
    pub fn set_has_braces(&mut self, braces: bool) -> bool {
        let applied = self
            .tree
            .with_block(self.owner, |tree, block| {
                if !braces && block.len() > 1 {
                    return false;
                }
                if braces {
                    add_braces(tree, block);
                } else {
                    block.set_braces(false);
                    block.format.set_end_newlines(0);
                    if let Some(child) = block.children().first() {
                        let newlines = tree.get(child).newlines().max(1);
                        tree.set_newlines(child, u32::from(newlines));
                        block.format.set_newlines(u32::from(newlines));
                    }
                }
                block.format.insert(FormatFlags::GROUPING_SET);
                true
            })
            .unwrap_or(false);
        if applied {
            self.tree.reformat_block(self.owner);
        }
        applied
    }

    /// Lay the block out on one line, or restore default line breaks.
    pub fn set_single_line(&mut self, single_line: bool) {
        self.tree.with_block(self.owner, |tree, block| {
            block.children().set_single_line(tree, single_line);
            if let Some(first) = block.children().first() {
                if single_line {
                    tree.set_newlines(first, 0);
                }
            }
            let breaks = u32::from(!single_line);
            block.format.set_newlines(breaks);
            block.format.set_end_newlines(breaks);
        });
    }

    fn store(&mut self, index: Option<usize>, child: NodeId) -> NodeId {
        self.tree
            .with_block(self.owner, |tree, block| {
                let stored = match index {
                    Some(index) => block.children.insert(tree, index, child),
                    None => block.children.add(tree, child),
                };
                mark_statement(tree, stored);
                tree.register_name(block, stored);
                stored
            })
            .unwrap_or(NodeId::NONE)
    }

    fn after_edit(&mut self) {
        let Some(block) = self.tree.block(self.owner) else {
            return;
        };
        let count = block.len();
        if count <= 2 || (!block.has_braces() && count > 1) {
            self.tree.reformat_block(self.owner);
        } else {
            self.tree.with_block(self.owner, |_, block| {
                block.clamp_end_newlines(MAX_END_NEWLINES);
            });
        }
    }
}

/// An expression placed directly in a block is an expression statement.
fn mark_statement(tree: &mut Tree, id: NodeId) {
    let format = tree.format(id);
    if matches!(tree.kind(id), NodeKind::Expression(_))
        && !format.contains(FormatFlags::TERMINATOR_SET)
    {
        tree.set_terminator(id, true);
    }
}

#[cfg(test)]
mod tests;
