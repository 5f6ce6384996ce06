//! Tree walker.
//!
//! The [`Renderer`] turns nodes back into text. Layout that the tree
//! records (newline counts, braces, tight spacing, comment positions) is
//! written as recorded; indentation comes from block depth.
//!
//! # Separation
//!
//! Everything placed after other output goes through
//! [`Renderer::separate`]: `n > 0` line breaks, or a single space unless
//! the item is tight. A line comment or directive leaves a pending break,
//! so whatever follows it starts a new line even if the tree says
//! otherwise.

mod blocks;
mod declarations;
mod runs;
mod statements;

use quill_ir::{
    Annotation, AnnotationKind, AnnotationPosition, CommentStyle, FormatFlags, NodeId, NodeKind,
    Position, Tree,
};

use crate::flags::RenderFlags;
use crate::writer::CodeWriter;

use runs::Lead;

pub(crate) struct Renderer<'t, 'w, W: CodeWriter + ?Sized> {
    tree: &'t Tree,
    w: &'w mut W,
    description: bool,
    update_positions: bool,
    /// Nothing was written since the last line break or space.
    separated: bool,
    /// The last output must end its line.
    pending_break: bool,
    /// Nothing written yet. A generated tree does not start with blank
    /// lines.
    fresh: bool,
    generated: bool,
    /// Column where the statement being rendered starts; continuation lines
    /// of its runs are placed relative to it.
    base: u32,
    positions: Vec<(NodeId, Position)>,
}

impl<'t, 'w, W: CodeWriter + ?Sized> Renderer<'t, 'w, W> {
    pub(crate) fn new(tree: &'t Tree, w: &'w mut W, flags: RenderFlags) -> Self {
        let base = w.position().column;
        Renderer {
            tree,
            w,
            description: flags.contains(RenderFlags::DESCRIPTION),
            update_positions: flags.contains(RenderFlags::UPDATE_POSITION),
            separated: true,
            pending_break: false,
            fresh: true,
            generated: tree.is_generated(),
            base,
            positions: Vec::new(),
        }
    }

    /// Positions recorded while rendering with `UPDATE_POSITION`.
    pub(crate) fn into_positions(self) -> Vec<(NodeId, Position)> {
        self.positions
    }

    // === Output primitives ===

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.pending_break {
            self.lines(1);
        }
        self.w.write(text);
        self.separated = false;
        self.fresh = false;
    }

    /// `text` preceded by a space unless it starts the line.
    fn word(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.space();
        self.text(text);
    }

    fn space(&mut self) {
        if !self.separated && !self.pending_break {
            self.w.write(" ");
            self.separated = true;
        }
    }

    fn lines(&mut self, count: u32) {
        self.w.write_lines(count);
        self.separated = true;
        self.pending_break = false;
    }

    /// Write `text` starting at `column` (zero-based) if it starts a line.
    fn text_at(&mut self, column: u32, text: &str) {
        self.w.begin_alignment(column);
        self.text(text);
        self.w.end_alignment();
    }

    /// Separate the next item from what precedes it.
    fn separate(&mut self, newlines: u8, tight: bool) {
        if self.description {
            if !tight {
                self.space();
            }
            return;
        }
        if newlines > 0 && self.fresh && self.generated {
            return;
        }
        if newlines > 0 {
            self.lines(u32::from(newlines));
        } else if self.pending_break {
            self.lines(1);
        } else if !tight {
            self.space();
        }
    }

    fn is_tight(&self, id: NodeId) -> bool {
        self.tree.format(id).contains(FormatFlags::TIGHT)
    }

    fn newlines(&self, id: NodeId) -> u8 {
        self.tree.format(id).newlines()
    }

    fn record(&mut self, id: NodeId) {
        if self.update_positions {
            let pos = self.w.position();
            self.positions.push((id, pos));
        }
    }

    // === Nodes ===

    /// Render a node where it sits: its line breaks, leading annotations,
    /// content, terminator and trailing annotations.
    pub(crate) fn node(&mut self, id: NodeId, local: RenderFlags) {
        let tree = self.tree;
        if !tree.is_live(id) {
            return;
        }
        self.leading(id, local);

        let saved = self.base;
        self.base = self.w.position().column;
        self.record(id);
        self.content(id);
        self.terminator(id);
        if !local.contains(RenderFlags::NO_EOL_COMMENTS) {
            self.trailing(id, AnnotationPosition::Eol);
        }
        self.trailing(id, AnnotationPosition::Postfix);
        self.base = saved;
    }

    /// An operand on its statement's line (condition, initializer, value).
    fn operand(&mut self, id: NodeId) {
        let tree = self.tree;
        if id.is_none() || !tree.is_live(id) {
            return;
        }
        let run = match tree.kind(id) {
            NodeKind::Expression(run) | NodeKind::Unrecognized(run) => Some(run),
            _ => None,
        };
        let breaks = run.and_then(|r| r.first()).is_some_and(|t| t.newlines > 0);
        if !breaks && !self.is_tight(id) {
            self.space();
        }
        self.record(id);
        match run {
            Some(run) if breaks => self.run(run, Lead::Inline),
            Some(run) => self.run(run, Lead::Head),
            None => self.content(id),
        }
        self.trailing(id, AnnotationPosition::Eol);
    }

    /// Line breaks and prefix annotations before `id`.
    fn leading(&mut self, id: NodeId, local: RenderFlags) {
        let tree = self.tree;
        let prefix: Vec<NodeId> = if local.contains(RenderFlags::NO_PREFIX) || self.description {
            Vec::new()
        } else {
            self.annotations(id, AnnotationPosition::Prefix)
        };
        let newlines = if local.contains(RenderFlags::SUPPRESS_NEWLINES) {
            0
        } else {
            self.newlines(id)
        };
        let first = prefix.first().copied().unwrap_or(id);
        self.separate(newlines, self.is_tight(first));
        for (i, &ann) in prefix.iter().enumerate() {
            self.annotation_body(ann);
            let next = prefix.get(i + 1).copied().unwrap_or(id);
            self.separate(tree.format(ann).newlines(), self.is_tight(next));
        }
    }

    /// Annotations of `host` at `position`, diagnostics left out.
    fn annotations(&self, host: NodeId, position: AnnotationPosition) -> Vec<NodeId> {
        let tree = self.tree;
        tree.annotations_at(host, position)
            .into_iter()
            .filter(|&a| tree.annotation(a).is_some_and(|ann| !ann.is_message()))
            .collect()
    }

    /// End-of-line or postfix annotations after `id`'s content.
    fn trailing(&mut self, id: NodeId, position: AnnotationPosition) {
        if self.description {
            return;
        }
        let tree = self.tree;
        let sandwiched = tree
            .kind(id)
            .modifiers()
            .is_some_and(|m| m.sandwiched);
        for ann in self.annotations(id, position) {
            let inline_directive = sandwiched
                && position == AnnotationPosition::Postfix
                && tree.annotation(ann).and_then(Annotation::directive).is_some();
            if inline_directive {
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

    fn terminator(&mut self, id: NodeId) {
        if self.tree.has_terminator(id) {
            self.text(";");
        }
    }

    fn content(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Disposed => {}
            NodeKind::Annotation(_) => self.annotation_body(id),
            NodeKind::Unrecognized(run) | NodeKind::Expression(run) => self.run(run, Lead::Head),
            NodeKind::CompilationUnit(block) => self.compilation_unit(block),
            NodeKind::Using(_)
            | NodeKind::Namespace(_)
            | NodeKind::TypeDecl(_)
            | NodeKind::EnumDecl(_)
            | NodeKind::Method(_)
            | NodeKind::Property(_)
            | NodeKind::Variable(_) => self.declaration(id),
            _ => self.statement(id),
        }
    }

    // === Annotations ===

    fn annotation_body(&mut self, id: NodeId) {
        let tree = self.tree;
        let Some(annotation) = tree.annotation(id) else {
            return;
        };
        match &annotation.kind {
            AnnotationKind::Comment { text, style } => {
                if self.description {
                    return;
                }
                self.text(text);
                if *style == CommentStyle::Line {
                    self.pending_break = true;
                }
            }
            AnnotationKind::DocComment { lines } => {
                if self.description {
                    return;
                }
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        self.lines(1);
                    }
                    self.text(line);
                }
                self.pending_break = true;
            }
            AnnotationKind::Attribute { text } => self.text(text),
            AnnotationKind::Directive(directive) => {
                if self.description {
                    return;
                }
                let line = directive.line_text();
                if tree.format(id).contains(FormatFlags::NO_INDENTATION) {
                    self.text_at(0, &line);
                } else {
                    self.text(&line);
                }
                if let Some(skipped) = &directive.skipped {
                    for source_line in skipped.split('\n') {
                        self.lines(1);
                        self.text_at(0, source_line.trim_end());
                    }
                }
                self.pending_break = true;
            }
            AnnotationKind::Message(_) => {}
        }
    }
}

#[cfg(test)]
mod tests;
