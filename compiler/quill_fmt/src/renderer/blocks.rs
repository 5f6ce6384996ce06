//! Block bodies and their delimiters.

use quill_ir::{AnnotationPosition, Block, BracePolicy, FormatFlags, NodeId, NodeKind};

use super::Renderer;
use crate::flags::RenderFlags;
use crate::writer::CodeWriter;

impl<W: CodeWriter + ?Sized> Renderer<'_, '_, W> {
    /// Comments between `owner`'s header and its block, then the block.
    pub(super) fn body(&mut self, owner: NodeId, block: &Block) {
        if !self.description {
            for ann in self.annotations(owner, AnnotationPosition::Infix) {
                if self.tree.annotation(ann).is_some_and(|a| a.anchor == 0) {
                    self.separate(self.newlines(ann), self.is_tight(ann));
                    self.annotation_body(ann);
                }
            }
        }
        self.block(owner, block);
    }

    pub(super) fn block(&mut self, owner: NodeId, block: &Block) {
        let policy = self.tree.brace_policy(owner);
        if block.is_empty_statement() {
            self.w.begin_indent();
            self.separate(block.newlines(), block.format().contains(FormatFlags::TIGHT));
            self.text(";");
            self.w.end_indent();
            return;
        }
        if block.has_braces() {
            self.braced(owner, block);
            return;
        }
        match policy {
            BracePolicy::Never => self.children(block),
            _ if self.description => {
                if !block.is_empty() {
                    self.word("...");
                }
            }
            BracePolicy::Implicit => {
                self.w.begin_indent();
                self.children(block);
                self.w.end_indent();
            }
            BracePolicy::Optional | BracePolicy::Required => {
                // A statement sharing the header's line (`else if`) stays
                // at the header's depth, and so does its own `else`.
                let own_line = block
                    .children()
                    .first()
                    .is_some_and(|child| self.newlines(child) > 0);
                if own_line {
                    self.w.begin_indent();
                }
                self.children(block);
                if own_line {
                    self.w.end_indent();
                }
                self.delimiter_annotations(block, AnnotationPosition::Eol);
            }
        }
    }

    fn braced(&mut self, owner: NodeId, block: &Block) {
        let tree = self.tree;
        if self.description {
            self.word(if block.is_empty() { "{ }" } else { "{ ... }" });
            return;
        }
        self.delimiter_annotations(block, AnnotationPosition::Prefix);
        if !matches!(tree.kind(owner), NodeKind::BlockStmt(_)) {
            self.separate(block.newlines(), false);
        }
        self.text("{");
        self.delimiter_annotations(block, AnnotationPosition::Eol);
        self.w.begin_indent();
        self.children(block);
        self.w.end_indent();
        self.separate(block.end_newlines(), block.format().contains(FormatFlags::TIGHT));
        self.text("}");
        self.delimiter_annotations(block, AnnotationPosition::Postfix);
    }

    fn children(&mut self, block: &Block) {
        for &child in block.children().as_slice() {
            self.node(child, RenderFlags::empty());
        }
    }

    fn delimiter_annotations(&mut self, block: &Block, position: AnnotationPosition) {
        if self.description {
            return;
        }
        let tree = self.tree;
        for &ann in block.annotations() {
            let Some(annotation) = tree.annotation(ann) else {
                continue;
            };
            if annotation.is_message() || annotation.position() != position {
                continue;
            }
            let newlines = if position == AnnotationPosition::Eol {
                0
            } else {
                self.newlines(ann)
            };
            self.separate(newlines, self.is_tight(ann));
            self.annotation_body(ann);
        }
    }

    pub(super) fn compilation_unit(&mut self, block: &Block) {
        self.children(block);
        if !self.description {
            let end = block.end_newlines();
            if end > 0 {
                self.lines(u32::from(end));
            }
        }
    }
}
