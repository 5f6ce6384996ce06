//! The node arena.
//!
//! A [`Tree`] owns every node of one parsed (or generated) file. Node 0 is
//! the compilation unit. Nodes refer to each other by [`NodeId`]; the tree
//! keeps parent links consistent as nodes are attached, cloned and
//! disposed.
//!
//! # Design
//!
//! Blocks live inside their owner's [`NodeKind`]. Operations that need both
//! the block and the rest of the tree use [`Tree::with_block`], which moves
//! the block out for the duration of the closure and puts it back after.

use crate::annotation::{Annotation, AnnotationFlags, AnnotationKind, AnnotationPosition};
use crate::annotation::{Message, Severity};
use crate::block::{Block, BracePolicy};
use crate::dictionary::{Lookup, Symbol};
use crate::format::{FormatFlags, FormatState};
use crate::node::{Category, Node, NodeKind};
use crate::node_id::NodeId;
use crate::span::Position;
use crate::token::Token;

/// Tree-wide settings recorded at parse time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TreeSettings {
    /// Brace and blank-line cleanup runs after parsing and after edits.
    pub auto_cleanup: bool,
    /// The source used `\r\n` line endings.
    pub crlf: bool,
}

impl Default for TreeSettings {
    fn default() -> Self {
        TreeSettings {
            auto_cleanup: true,
            crlf: false,
        }
    }
}

/// Diagnostic counts by severity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct DiagnosticCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl DiagnosticCounts {
    #[inline]
    pub fn total(self) -> usize {
        self.errors + self.warnings + self.infos
    }
}

/// A diagnostic and the node it is attached to.
#[derive(Copy, Clone, Debug)]
pub struct Diagnostic<'a> {
    pub node: NodeId,
    pub severity: Severity,
    pub text: &'a str,
    pub pos: Position,
}

/// Arena of nodes for one file.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    settings: TreeSettings,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Empty tree for programmatic construction.
    pub fn new() -> Self {
        let mut tree = Self::for_source(TreeSettings::default());
        tree.nodes[0].format.insert(FormatFlags::IS_GENERATED);
        tree
    }

    /// Empty tree to be filled by the parser.
    pub fn for_source(settings: TreeSettings) -> Self {
        let root = NodeId::new(0);
        let mut block = Block::unbraced(root);
        block.format.set_newlines(0);
        let node = Node::new(
            NodeKind::CompilationUnit(block),
            FormatState::with_newlines(0),
            Position::START,
        );
        Tree {
            nodes: vec![node],
            root,
            settings,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn settings(&self) -> TreeSettings {
        self.settings
    }

    pub fn settings_mut(&mut self) -> &mut TreeSettings {
        &mut self.settings
    }

    /// True if the tree was built in code rather than parsed.
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.nodes[self.root.index()]
            .format
            .contains(FormatFlags::IS_GENERATED)
    }

    /// Number of arena slots, disposed ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // === Allocation ===

    /// Allocate a node built in code. Formatting is derived from its kind;
    /// nodes referenced by `kind` are re-parented to it.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let mut format = FormatState::default();
        format.insert(FormatFlags::IS_GENERATED);
        let id = self.push(Node::new(kind, format, Position::START));
        self.claim_children(id);
        self.default_format(id);
        id
    }

    /// Allocate a node read from source with an explicit newline count.
    pub fn alloc_parsed(&mut self, kind: NodeKind, newlines: u32, pos: Position) -> NodeId {
        let id = self.push(Node::new(kind, FormatState::with_newlines(newlines), pos));
        self.claim_children(id);
        id
    }

    /// Allocate an annotation node.
    pub fn alloc_annotation(&mut self, annotation: Annotation, newlines: u32, pos: Position) -> NodeId {
        self.alloc_parsed(NodeKind::Annotation(annotation), newlines, pos)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX - 1);
        self.nodes.push(node);
        NodeId::new(index)
    }

    /// Point the children embedded in `id`'s kind back at `id`.
    fn claim_children(&mut self, id: NodeId) {
        let children = self.child_nodes(id);
        if let Some(block) = self.nodes[id.index()].kind.block_mut() {
            block.children.set_parent_id(id);
        }
        for child in children {
            self.nodes[child.index()].parent = id;
        }
    }

    // === Access ===

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> NodeId {
        self.nodes[id.index()].parent
    }

    #[inline]
    pub fn format(&self, id: NodeId) -> FormatState {
        self.nodes[id.index()].format
    }

    #[inline]
    pub fn format_mut(&mut self, id: NodeId) -> &mut FormatState {
        &mut self.nodes[id.index()].format
    }

    #[inline]
    pub fn annotation(&self, id: NodeId) -> Option<&Annotation> {
        self.nodes.get(id.index())?.kind.annotation()
    }

    #[inline]
    pub fn annotation_mut(&mut self, id: NodeId) -> Option<&mut Annotation> {
        self.nodes.get_mut(id.index())?.kind.annotation_mut()
    }

    /// True for an in-range id whose node was not disposed.
    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(|n| !matches!(n.kind, NodeKind::Disposed))
    }

    pub fn set_pos(&mut self, id: NodeId, pos: Position) {
        self.nodes[id.index()].pos = pos;
    }

    /// The block owned by `owner`.
    #[inline]
    pub fn block(&self, owner: NodeId) -> Option<&Block> {
        self.nodes.get(owner.index())?.kind.block()
    }

    #[inline]
    pub fn block_mut(&mut self, owner: NodeId) -> Option<&mut Block> {
        self.nodes.get_mut(owner.index())?.kind.block_mut()
    }

    /// Children of `owner`'s block (empty if it has none).
    pub fn children(&self, owner: NodeId) -> &[NodeId] {
        self.block(owner).map_or(&[][..], |b| b.children.as_slice())
    }

    /// Run `f` with `owner`'s block moved out of the tree.
    pub fn with_block<R>(
        &mut self,
        owner: NodeId,
        f: impl FnOnce(&mut Tree, &mut Block) -> R,
    ) -> Option<R> {
        let mut block = std::mem::take(self.nodes.get_mut(owner.index())?.kind.block_mut()?);
        let result = f(self, &mut block);
        if let Some(slot) = self.nodes[owner.index()].kind.block_mut() {
            *slot = block;
        }
        Some(result)
    }

    /// Direct children in render order: annotations, operands, block
    /// annotations, block children, then an `else` clause.
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let node = &self.nodes[id.index()];
        let mut out = node.annotations.clone();
        let else_clause = match &node.kind {
            NodeKind::If(s) => s.else_clause,
            _ => None,
        };
        out.extend(node.kind.operands().filter(|&op| Some(op) != else_clause));
        if let Some(block) = node.kind.block() {
            out.extend_from_slice(&block.annotations);
            out.extend(block.children.iter());
        }
        out.extend(else_clause);
        out
    }

    /// `id` and everything below it, preorder.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.child_nodes(next).into_iter().rev());
        }
        out
    }

    // === Parent links and formatting ===

    /// Link `id` under `parent` and re-derive any formatting not set
    /// explicitly.
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.nodes[id.index()].parent = parent;
        self.default_format(id);
    }

    /// Clear the parent link.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.parent = NodeId::NONE;
        }
    }

    /// Prepare `item` to be stored under `parent`. If it still belongs to a
    /// different live parent, a deep clone is adopted instead. Returns the
    /// id to store.
    pub fn adopt(&mut self, item: NodeId, parent: NodeId) -> NodeId {
        let current = self.parent(item);
        let item = if current.is_some() && current != parent && self.is_live(current) {
            tracing::trace!(?item, ?current, ?parent, "adopting a clone of an attached node");
            self.deep_clone(item)
        } else {
            item
        };
        self.set_parent(item, parent);
        item
    }

    /// Fill in default newline and terminator state for every aspect not
    /// set explicitly. Idempotent.
    pub fn default_format(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.index()];
        if !node.format.contains(FormatFlags::NEWLINES_SET) {
            node.format.set_default_newlines(node.kind.default_newlines());
        }
        if !node.format.contains(FormatFlags::TERMINATOR_SET) {
            let terminated = node.kind.default_terminator();
            node.format.set(FormatFlags::HAS_TERMINATOR, terminated);
        }
    }

    /// Set an explicit newline count (clamped to the format maximum).
    pub fn set_newlines(&mut self, id: NodeId, newlines: u32) {
        self.nodes[id.index()].format.set_newlines(newlines);
    }

    /// Drop an explicit newline count and go back to the kind's default.
    pub fn reset_newlines(&mut self, id: NodeId) {
        self.nodes[id.index()]
            .format
            .remove(FormatFlags::NEWLINES_SET);
        self.default_format(id);
    }

    /// Set whether `id` ends with `;`. Ignored for kinds that cannot.
    pub fn set_terminator(&mut self, id: NodeId, terminated: bool) {
        let node = &mut self.nodes[id.index()];
        if !node.kind.allows_terminator() {
            return;
        }
        node.format.set(FormatFlags::HAS_TERMINATOR, terminated);
        node.format.insert(FormatFlags::TERMINATOR_SET);
    }

    #[inline]
    pub fn has_terminator(&self, id: NodeId) -> bool {
        self.format(id).contains(FormatFlags::HAS_TERMINATOR)
    }

    // === Annotations ===

    /// Attach annotation node `ann` to `host` at `position`.
    ///
    /// For prefix annotations (other than diagnostics) the newline counts
    /// are kept in "gap after" form: if the annotation's count exceeds the
    /// host's, or the annotation is prepended and the counts differ, the
    /// two counts are swapped. A first-on-line annotation also promotes a
    /// host that defaults to starting a line but currently has no newline
    /// and no explicit override.
    pub fn attach_annotation(
        &mut self,
        host: NodeId,
        ann: NodeId,
        position: AnnotationPosition,
        at_front: bool,
    ) {
        let old = self.parent(ann);
        if old.is_some() && old != host {
            self.unlink_annotation(old, ann);
        }
        let is_message = {
            let Some(annotation) = self.nodes[ann.index()].kind.annotation_mut() else {
                tracing::debug!(?ann, "attach_annotation: not an annotation node");
                return;
            };
            annotation.flags.remove(AnnotationFlags::POSITION_MASK);
            annotation.flags.insert(position.flags());
            annotation.is_message()
        };
        self.nodes[ann.index()].parent = host;
        let list = &mut self.nodes[host.index()].annotations;
        list.retain(|&a| a != ann);
        if at_front {
            list.insert(0, ann);
        } else {
            list.push(ann);
        }

        if position != AnnotationPosition::Prefix || is_message {
            return;
        }

        let first_on_line = self.nodes[ann.index()]
            .kind
            .annotation()
            .is_some_and(|a| a.flags.contains(AnnotationFlags::IS_FIRST_ON_LINE));
        let host_node = &mut self.nodes[host.index()];
        if first_on_line
            && host_node.format.newlines() == 0
            && !host_node.format.contains(FormatFlags::NEWLINES_SET)
            && host_node.kind.default_newlines() > 0
        {
            let promoted = host_node.kind.default_newlines();
            host_node.format.set_default_newlines(promoted);
        }

        let host_nl = self.nodes[host.index()].format.newlines();
        let ann_nl = self.nodes[ann.index()].format.newlines();
        if ann_nl > host_nl || (at_front && ann_nl != host_nl) {
            let mut host_fmt = self.nodes[host.index()].format;
            let mut ann_fmt = self.nodes[ann.index()].format;
            FormatState::swap_newlines(&mut host_fmt, &mut ann_fmt);
            self.nodes[host.index()].format = host_fmt;
            self.nodes[ann.index()].format = ann_fmt;
        }
    }

    /// Remove `ann` from `host`'s annotations. Returns whether it was there.
    pub fn detach_annotation(&mut self, host: NodeId, ann: NodeId) -> bool {
        let removed = self.unlink_annotation(host, ann);
        if removed {
            self.detach(ann);
        }
        removed
    }

    fn unlink_annotation(&mut self, host: NodeId, ann: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(host.index()) else {
            return false;
        };
        let before = node.annotations.len();
        node.annotations.retain(|&a| a != ann);
        if node.annotations.len() != before {
            return true;
        }
        node.kind.block_mut().is_some_and(|block| {
            let before = block.annotations.len();
            block.annotations.retain(|&a| a != ann);
            block.annotations.len() != before
        })
    }

    /// Attach `ann` to the delimiters of `owner`'s block.
    pub fn attach_block_annotation(&mut self, owner: NodeId, ann: NodeId, position: AnnotationPosition) {
        if let Some(annotation) = self.nodes[ann.index()].kind.annotation_mut() {
            annotation.flags.remove(AnnotationFlags::POSITION_MASK);
            annotation.flags.insert(position.flags());
        }
        let Some(block) = self.nodes[owner.index()].kind.block_mut() else {
            tracing::debug!(?owner, "attach_block_annotation: owner has no block");
            return;
        };
        block.annotations.push(ann);
        self.nodes[ann.index()].parent = owner;
    }

    /// Annotations of `host` at `position`, in order.
    pub fn annotations_at(&self, host: NodeId, position: AnnotationPosition) -> Vec<NodeId> {
        self.nodes[host.index()]
            .annotations
            .iter()
            .copied()
            .filter(|&a| self.annotation(a).is_some_and(|ann| ann.position() == position))
            .collect()
    }

    /// Move the comments trailing `token` onto `host` as end-of-line
    /// annotations. Only the line-ending comment moves unless
    /// `include_inline` is set. Returns the end-of-line annotation.
    pub fn move_eol_comment(
        &mut self,
        host: NodeId,
        token: &mut Token,
        include_inline: bool,
    ) -> Option<NodeId> {
        let mut eol = None;
        let trailing = std::mem::take(&mut token.trailing);
        for comment in trailing {
            if !(comment.is_eol || include_inline) {
                token.trailing.push(comment);
                continue;
            }
            let is_eol = comment.is_eol;
            let ann = self.alloc_annotation(
                Annotation::new(AnnotationKind::Comment {
                    text: comment.text,
                    style: comment.style,
                }),
                0,
                token.pos,
            );
            if !comment.space_before {
                self.nodes[ann.index()].format.insert(FormatFlags::TIGHT);
            }
            self.attach_annotation(host, ann, AnnotationPosition::Eol, false);
            if is_eol {
                eol = Some(ann);
            }
        }
        eol
    }

    /// Attach a diagnostic to `host`.
    pub fn attach_message(&mut self, host: NodeId, severity: Severity, text: impl Into<Box<str>>) -> NodeId {
        let pos = self.nodes[host.index()].pos;
        let ann = self.alloc_annotation(Annotation::message(severity, text), 0, pos);
        self.attach_annotation(host, ann, AnnotationPosition::Postfix, false);
        ann
    }

    // === Diagnostics ===

    /// Diagnostics reachable from the root, in tree order.
    pub fn diagnostics(&self) -> Vec<Diagnostic<'_>> {
        self.descendants(self.root)
            .into_iter()
            .filter_map(|id| match &self.nodes[id.index()].kind {
                NodeKind::Annotation(Annotation {
                    kind: AnnotationKind::Message(Message { severity, text }),
                    ..
                }) => {
                    let host = self.parent(id);
                    Some(Diagnostic {
                        node: host,
                        severity: *severity,
                        text: &**text,
                        pos: self.nodes[host.index()].pos,
                    })
                }
                _ => None,
            })
            .collect()
    }

    pub fn diagnostic_counts(&self) -> DiagnosticCounts {
        let mut counts = DiagnosticCounts::default();
        for diagnostic in self.diagnostics() {
            match diagnostic.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Information => counts.infos += 1,
            }
        }
        counts
    }

    // === Cloning and disposal ===

    /// Copy `id` and everything below it. The copy has no parent.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut node = self.nodes[id.index()].clone();
        node.parent = NodeId::NONE;
        node.format = node.format.for_clone();
        let annotations = std::mem::take(&mut node.annotations);
        let mut kind = std::mem::replace(&mut node.kind, NodeKind::Disposed);
        let new_id = self.push(node);

        let cloned: Vec<NodeId> = annotations
            .into_iter()
            .map(|ann| {
                let copy = self.deep_clone(ann);
                self.nodes[copy.index()].parent = new_id;
                copy
            })
            .collect();

        kind.map_children(&mut |child| {
            let copy = self.deep_clone(child);
            self.nodes[copy.index()].parent = new_id;
            copy
        });
        if let Some(block) = kind.block_mut() {
            block.children.set_parent_id(new_id);
        }

        let node = &mut self.nodes[new_id.index()];
        node.annotations = cloned;
        node.kind = kind;
        self.rebuild_dictionary(new_id);
        new_id
    }

    /// Destroy `id` and everything below it. The node is unlinked from its
    /// parent's child and annotation lists; all parent links are nulled.
    pub fn dispose(&mut self, id: NodeId) {
        let parent = self.parent(id);
        if parent.is_some() && self.is_live(parent) {
            let removed = self.with_block(parent, |tree, block| {
                match block.children.position(id) {
                    Some(index) => {
                        block.children.take_at(index);
                        tree.unregister_name(block, id);
                        true
                    }
                    None => false,
                }
            });
            if removed != Some(true) {
                self.unlink_annotation(parent, id);
            }
        }
        for node in self.descendants(id) {
            let slot = &mut self.nodes[node.index()];
            slot.parent = NodeId::NONE;
            slot.annotations.clear();
            slot.kind = NodeKind::Disposed;
        }
    }

    // === Names ===

    /// Recompute the name dictionary of `owner`'s block from its children.
    pub fn rebuild_dictionary(&mut self, owner: NodeId) {
        self.with_block(owner, |tree, block| {
            block.dictionary.clear();
            let children: Vec<NodeId> = block.children.iter().collect();
            for child in children {
                tree.register_name(block, child);
            }
        });
    }

    pub(crate) fn register_name(&self, block: &mut Block, child: NodeId) {
        match &self.nodes[child.index()].kind {
            NodeKind::Label(label) => block
                .dictionary
                .add_goto_target(&label.name, Symbol::Node(child)),
            kind => {
                if let Some(name) = kind.name() {
                    block.dictionary.add(name, Symbol::Node(child));
                }
            }
        }
    }

    pub(crate) fn unregister_name(&self, block: &mut Block, child: NodeId) {
        match &self.nodes[child.index()].kind {
            NodeKind::Label(label) => {
                block
                    .dictionary
                    .remove_goto_target(&label.name, Symbol::Node(child));
            }
            kind => {
                if let Some(name) = kind.name() {
                    block.dictionary.remove(name, Symbol::Node(child));
                }
            }
        }
    }

    /// Resolve `name` from `scope` outward through enclosing blocks.
    pub fn lookup(&self, scope: NodeId, name: &str) -> Lookup<'_> {
        let mut current = scope;
        while current.is_some() {
            if let Some(block) = self.block(current) {
                let found = block.dictionary.find(name);
                if !found.is_none() {
                    return found;
                }
            }
            current = self.parent(current);
        }
        Lookup::None
    }

    /// Resolve a `goto` label from `from` outward, stopping at the
    /// enclosing method.
    pub fn find_goto_target(&self, from: NodeId, label: &str) -> Option<Symbol> {
        let mut current = from;
        while current.is_some() {
            if let Some(block) = self.block(current) {
                if let Some(symbol) = block.dictionary.find_goto_target(label).single() {
                    return Some(symbol);
                }
            }
            if matches!(self.kind(current), NodeKind::Method(_)) {
                break;
            }
            current = self.parent(current);
        }
        None
    }

    /// Brace policy of `owner`'s block.
    #[inline]
    pub fn brace_policy(&self, owner: NodeId) -> BracePolicy {
        self.kind(owner).brace_policy()
    }

    #[inline]
    pub fn category(&self, id: NodeId) -> Category {
        self.kind(id).category()
    }
}

#[cfg(test)]
mod tests;
