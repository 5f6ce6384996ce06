//! The block engine.
//!
//! Parses the statements of one block into its owner. Comments, directives,
//! modifier keywords and broken fragments go to the [`Backlog`](crate::backlog::Backlog)
//! first; they are placed once the engine knows what follows them:
//!
//! - a statement commits the backlog as siblings before it (or, in a
//!   braceless single-statement body, as its leading annotations);
//! - fragments left at the end of a block coalesce into one
//!   [`Unrecognized`](NodeKind::Unrecognized) node per source line;
//! - a final pass moves free-standing comments that lead a statement onto
//!   that statement.
//!
//! # Modes
//!
//! | mode         | body                                          |
//! |--------------|-----------------------------------------------|
//! | `Required`   | `{ ... }` or nothing                          |
//! | `Optional`   | `{ ... }`, a lone `;`, or one statement       |
//! | `Terminated` | statements up to a stop token (`case` bodies) |
//! | `ToEof`      | statements up to end of input                 |

use quill_ir::{
    Annotation, AnnotationKind, AnnotationPosition, Block, DirectiveKind, FormatFlags, NodeId,
    NodeKind, TokenKind, TokenRun, TokenSet,
};

use crate::backlog::Entry;
use crate::error::{PResult, ParseError};
use crate::grammar::{Context, Item};
use crate::stack::ensure_sufficient_stack;
use crate::{column_offset, Parser};

/// Most line breaks between a comment and the statement it leads.
const MAX_COMMENT_GAP: u8 = 1;
/// Doc comments may stand further from their declaration.
const MAX_DOC_COMMENT_GAP: u8 = 3;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum BlockMode {
    Required,
    Optional,
    /// Stop before any of these tokens.
    Terminated(TokenSet),
    ToEof,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum BlockOutcome {
    Parsed,
    /// Braces were required and absent; nothing was consumed.
    Missing,
    /// A braceless body ended up with no statement.
    Collapsed,
}

/// A block under construction. Installed into its owner when done.
struct BlockBuilder {
    owner: NodeId,
    block: Block,
    braced: bool,
    /// Braceless body holding exactly one statement.
    single: bool,
    /// Comments on `{` and `}`, attached after installation.
    delimiter_annotations: Vec<(NodeId, AnnotationPosition)>,
}

impl BlockBuilder {
    fn new(owner: NodeId) -> Self {
        BlockBuilder {
            owner,
            block: Block::unbraced(owner),
            braced: false,
            single: false,
            delimiter_annotations: Vec::new(),
        }
    }
}

impl Parser {
    /// Parse the body of `owner` and store it as `owner`'s block.
    pub(crate) fn parse_block(
        &mut self,
        owner: NodeId,
        mode: BlockMode,
        context: Context,
    ) -> PResult<BlockOutcome> {
        if self.depth >= self.max_nesting {
            return Err(ParseError::TooDeeplyNested {
                limit: self.max_nesting,
                pos: self.cursor.current_pos(),
            });
        }
        self.depth += 1;
        self.backlog.enter();
        let result = ensure_sufficient_stack(|| self.block_body(owner, mode, context));
        self.backlog.leave();
        self.depth -= 1;

        let Some(mut builder) = result? else {
            return Ok(BlockOutcome::Missing);
        };

        let mut outcome = BlockOutcome::Parsed;
        if !builder.braced && mode != BlockMode::ToEof {
            match builder.block.children().first() {
                Some(first) => {
                    let newlines = self.tree.get(first).newlines();
                    builder.block.format_mut().set_newlines(u32::from(newlines));
                }
                None if builder.block.is_empty_statement() => {}
                None => outcome = BlockOutcome::Collapsed,
            }
        }

        if let Some(slot) = self.tree.block_mut(owner) {
            *slot = builder.block;
        }
        for (ann, position) in builder.delimiter_annotations {
            self.tree.attach_block_annotation(owner, ann, position);
        }
        self.tree.reformat_block(owner);
        self.tree.rebuild_dictionary(owner);
        Ok(outcome)
    }

    fn block_body(
        &mut self,
        owner: NodeId,
        mode: BlockMode,
        context: Context,
    ) -> PResult<Option<BlockBuilder>> {
        let mut b = BlockBuilder::new(owner);
        self.attach_stray(owner, AnnotationPosition::Infix);

        if matches!(mode, BlockMode::Required | BlockMode::Optional) {
            let next = self.cursor.significant_from(self.cursor.position());
            if self.cursor.kind_at(next) == TokenKind::LBrace {
                // Own-line comments between the header and `{`.
                while self.cursor.position() < next {
                    let ann = self.trivia_annotation();
                    self.tree
                        .attach_annotation(owner, ann, AnnotationPosition::Infix, false);
                }
                self.open_brace(&mut b);
            } else if mode == BlockMode::Required {
                return Ok(None);
            } else if self.cursor.check(TokenKind::Semicolon) {
                self.empty_statement(&mut b);
                return Ok(Some(b));
            } else {
                b.single = true;
            }
        }

        let flush_at_end = b.braced || mode == BlockMode::ToEof;
        loop {
            let kind = self.cursor.current_kind();
            match kind {
                TokenKind::Eof => {
                    if b.braced {
                        self.error(owner, "expected `}`");
                    }
                    if mode == BlockMode::ToEof {
                        let newlines = self.cursor.current().newlines;
                        b.block.format_mut().set_end_newlines(newlines);
                    }
                    if flush_at_end {
                        self.flush_backlog(&mut b, false);
                    }
                    break;
                }
                TokenKind::RBrace if b.braced => {
                    self.close_brace(&mut b);
                    break;
                }
                TokenKind::RBrace if mode == BlockMode::ToEof => {
                    let index = self.cursor.bump();
                    self.backlog.push(Entry::Token(index));
                }
                TokenKind::RBrace => break,
                k if matches!(mode, BlockMode::Terminated(stop) if stop.contains(k)) => break,
                k if k.is_trivia() => {
                    let ann = self.trivia_annotation();
                    self.backlog.push(Entry::Node(ann));
                }
                _ => {
                    let before = self.cursor.position();
                    match self.parse_item(context)? {
                        Item::Statement(id) if b.single => {
                            self.commit_single(&mut b, id);
                            break;
                        }
                        Item::Statement(id) => {
                            self.flush_backlog(&mut b, false);
                            self.commit(&mut b, id);
                        }
                        Item::Pending(entry) => {
                            self.backlog.push(entry);
                            if b.single && !self.is_modifier_entry(entry) {
                                self.flush_backlog(&mut b, true);
                                break;
                            }
                        }
                    }
                    if self.cursor.position() == before && !self.cursor.at_eof() {
                        tracing::debug!(pos = %self.cursor.current_pos(), "no progress; skipping token");
                        let index = self.cursor.bump();
                        self.backlog.push(Entry::Token(index));
                    }
                }
            }
        }

        if !b.single {
            self.reattach_leading_comments(&mut b);
        }
        Ok(Some(b))
    }

    fn open_brace(&mut self, b: &mut BlockBuilder) {
        let newlines = self.cursor.current().newlines;
        let index = self.cursor.bump();
        b.braced = true;
        b.block.set_braces(true);
        b.block.format_mut().set_newlines(newlines);
        let pos = self.cursor.token(index).pos;
        for comment in self.cursor.take_trailing(index) {
            let ann = self.comment_annotation(comment, pos);
            b.delimiter_annotations.push((ann, AnnotationPosition::Eol));
        }
    }

    fn close_brace(&mut self, b: &mut BlockBuilder) {
        let start = self.start();
        self.flush_backlog(b, false);
        let index = self.cursor.bump();
        let format = b.block.format_mut();
        format.set_end_newlines(start.newlines);
        if start.newlines == 0 && !start.space_before {
            format.insert(FormatFlags::TIGHT);
        }
        for comment in self.cursor.take_trailing(index) {
            let ann = self.comment_annotation(comment, start.pos);
            b.delimiter_annotations.push((ann, AnnotationPosition::Postfix));
        }
    }

    /// `while (x);`: the body is a lone `;`.
    fn empty_statement(&mut self, b: &mut BlockBuilder) {
        let start = self.start();
        let index = self.cursor.bump();
        b.block.set_empty_statement(true);
        let format = b.block.format_mut();
        format.set_newlines(start.newlines);
        if start.newlines == 0 && !start.space_before {
            format.insert(FormatFlags::TIGHT);
        }
        if let Some(token) = self.cursor.token_mut(index) {
            self.tree.move_eol_comment(b.owner, token, true);
        }
    }

    fn commit(&mut self, b: &mut BlockBuilder, id: NodeId) {
        self.tree.set_parent(id, b.owner);
        b.block.push_parsed(id);
    }

    /// Commit the only statement of a braceless body. Pending comments and
    /// directives become its leading annotations.
    fn commit_single(&mut self, b: &mut BlockBuilder, id: NodeId) {
        let stray_tokens = self
            .backlog
            .pending()
            .iter()
            .any(|&entry| !self.is_annotation_entry(entry));
        if stray_tokens {
            // Leftovers become siblings; braces get added.
            self.flush_backlog(b, false);
            self.commit(b, id);
            return;
        }
        for entry in self.backlog.take_pending().into_iter().rev() {
            if let Entry::Node(ann) = entry {
                self.tree
                    .attach_annotation(id, ann, AnnotationPosition::Prefix, true);
            }
        }
        self.commit(b, id);
        self.absorb_conditional_tail(id);
    }

    /// A statement wrapped in `#if` keeps the directives that close it.
    fn absorb_conditional_tail(&mut self, id: NodeId) {
        let mut open = 0i32;
        for &ann in self.tree.get(id).annotations() {
            match directive_kind(self.tree.annotation(ann)) {
                Some(DirectiveKind::If) => open += 1,
                Some(DirectiveKind::Endif) => open -= 1,
                _ => {}
            }
        }
        while open > 0 && self.cursor.check(TokenKind::Directive) {
            let kind = self.cursor.current().directive.as_ref().map(|d| d.kind);
            if !kind.is_some_and(DirectiveKind::is_conditional) {
                break;
            }
            let ann = self.trivia_annotation();
            self.tree
                .attach_annotation(id, ann, AnnotationPosition::Postfix, false);
            match kind {
                Some(DirectiveKind::If) => open += 1,
                Some(DirectiveKind::Endif) => open -= 1,
                _ => {}
            }
        }
    }

    fn is_annotation_entry(&self, entry: Entry) -> bool {
        matches!(entry, Entry::Node(id) if self.tree.kind(id).is_annotation())
    }

    fn is_modifier_entry(&self, entry: Entry) -> bool {
        match entry {
            Entry::Token(index) => {
                let kind = self.cursor.kind_at(index);
                kind.modifier().is_some() || kind == TokenKind::Ident
            }
            Entry::Node(_) => false,
        }
    }

    // === Backlog flush ===

    /// Commit everything pending. Fragments on one line share one
    /// unrecognized node; `single` folds all of them into one node with the
    /// pending annotations leading it.
    fn flush_backlog(&mut self, b: &mut BlockBuilder, single: bool) {
        let entries = self.backlog.take_pending();
        let mut open: Option<NodeId> = None;
        let mut leading = Vec::new();
        for entry in entries {
            if let Entry::Node(id) = entry {
                if self.tree.kind(id).is_annotation() {
                    if single {
                        leading.push(id);
                    } else {
                        open = None;
                        self.commit(b, id);
                    }
                    continue;
                }
            }
            let newlines = self.entry_newlines(entry);
            match open {
                Some(target) if single || newlines == 0 => self.merge_fragment(target, entry),
                _ => {
                    let id = self.unrecognized(entry);
                    self.commit(b, id);
                    open = Some(id);
                }
            }
        }
        match open {
            Some(host) if single => {
                for ann in leading.into_iter().rev() {
                    self.tree
                        .attach_annotation(host, ann, AnnotationPosition::Prefix, true);
                }
            }
            _ => {
                for ann in leading {
                    self.commit(b, ann);
                }
            }
        }
    }

    pub(crate) fn entry_newlines(&self, entry: Entry) -> u32 {
        match entry {
            Entry::Node(id) => u32::from(self.tree.get(id).newlines()),
            Entry::Token(index) => self.cursor.token(index).newlines,
        }
    }

    /// Start an unrecognized node from a fragment.
    fn unrecognized(&mut self, entry: Entry) -> NodeId {
        match entry {
            Entry::Node(id) => {
                let kind = self.tree.kind_mut(id);
                if let NodeKind::Expression(run) = kind {
                    let run = std::mem::take(run);
                    *kind = NodeKind::Unrecognized(run);
                }
                self.error(id, "expected `;` after expression");
                id
            }
            Entry::Token(index) => {
                let start = self.start_at(index);
                let text = self.text(index);
                let mut run = TokenRun::new();
                self.push_run_token(&mut run, index, start.pos.column);
                let id = self.alloc_at(NodeKind::Unrecognized(run), start);
                self.error(id, format!("unexpected `{text}`"));
                id
            }
        }
    }

    /// Append a fragment to the unrecognized node `target`.
    fn merge_fragment(&mut self, target: NodeId, entry: Entry) {
        let base = self.tree.get(target).pos().column;
        let extra = match entry {
            Entry::Token(index) => {
                let mut run = TokenRun::new();
                self.push_run_token(&mut run, index, base);
                run
            }
            Entry::Node(id) => {
                let shift = column_offset(self.tree.get(id).pos().column, base);
                let newlines = self.tree.get(id).newlines();
                let mut run = match self.tree.kind_mut(id) {
                    NodeKind::Expression(run) | NodeKind::Unrecognized(run) => std::mem::take(run),
                    _ => TokenRun::new(),
                };
                if let Some(first) = run.tokens.first_mut() {
                    first.newlines = newlines;
                }
                for token in &mut run.tokens {
                    if token.newlines > 0 {
                        token.offset = token.offset.saturating_add(shift);
                    }
                }
                let annotations = self.tree.get(id).annotations().to_vec();
                for ann in annotations {
                    let position = self
                        .tree
                        .annotation(ann)
                        .map_or(AnnotationPosition::Eol, Annotation::position);
                    self.tree.attach_annotation(target, ann, position, false);
                }
                self.tree.dispose(id);
                run
            }
        };
        if let NodeKind::Unrecognized(run) = self.tree.kind_mut(target) {
            run.append(extra);
        }
    }

    // === Leading comments ===

    /// Move free-standing comments onto the statement they lead, last
    /// first so a run of comments stays together.
    fn reattach_leading_comments(&mut self, b: &mut BlockBuilder) {
        let mut i = b.block.len().saturating_sub(1);
        while i > 0 {
            i -= 1;
            if !self.leads_next(b.block.children().as_slice(), i) {
                continue;
            }
            let Some(next) = b.block.children().get(i + 1) else {
                continue;
            };
            if let Some(comment) = b.block.take_parsed(i) {
                self.tree
                    .attach_annotation(next, comment, AnnotationPosition::Prefix, true);
            }
        }
    }

    fn leads_next(&self, children: &[NodeId], i: usize) -> bool {
        let Some(ann) = self.tree.annotation(children[i]) else {
            return false;
        };
        let Some(&next) = children.get(i + 1) else {
            return false;
        };
        let next_kind = self.tree.kind(next);
        let is_statement = next_kind.is_statement()
            || (matches!(next_kind, NodeKind::Expression(_)) && self.tree.has_terminator(next));
        if !is_statement {
            return false;
        }
        let doc = match &ann.kind {
            AnnotationKind::Attribute { .. } => return true,
            AnnotationKind::Comment { .. } => false,
            AnnotationKind::DocComment { .. } => true,
            AnnotationKind::Directive(_) | AnnotationKind::Message(_) => return false,
        };

        let gap = self.tree.get(next).newlines();
        let max_gap = if doc { MAX_DOC_COMMENT_GAP } else { MAX_COMMENT_GAP };
        if gap == 0 || gap > max_gap {
            return false;
        }

        let after_ok = doc
            || children.get(i + 2).map_or(true, |&after| {
                self.tree.get(after).newlines() > 0 || self.tree.kind(after).is_annotation()
            });
        let before_ok = i < 2
            || self.tree.get(children[i]).newlines() > 1
            || self
                .tree
                .annotation(children[i - 1])
                .is_some_and(Annotation::is_comment);
        after_ok && before_ok
    }
}

fn directive_kind(annotation: Option<&Annotation>) -> Option<DirectiveKind> {
    annotation.and_then(Annotation::directive).map(|d| d.kind)
}

#[cfg(test)]
mod tests;
