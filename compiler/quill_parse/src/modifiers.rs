//! Modifier resolution.
//!
//! When a declaration's head is reached, its modifier keywords are already
//! in the backlog. [`Parser::take_modifiers`] claims them from the end of
//! the backlog.
//!
//! # Sandwiched modifiers
//!
//! Modifiers may differ between conditional branches:
//!
//! ```text
//! #if DEBUG
//! public
//! #else
//! internal
//! #endif
//! static class Log { }
//! ```
//!
//! The declaration keeps the active branch's keywords as its modifiers. The
//! opening directives before the first keyword become prefix annotations;
//! the rest become postfix annotations anchored between modifier tokens.
//! Modifiers after the `#endif` move into every branch: the active branch
//! gets the tokens, and each inactive branch's stored source is rewritten
//! with the keywords in canonical order. A missing `#else` is synthesized
//! so both outcomes stay complete.

use quill_ir::{
    split_leading_modifiers, Annotation, AnnotationFlags, AnnotationKind, AnnotationPosition,
    Directive, DirectiveKind, ModifierFlags, ModifierToken, Modifiers, NodeId,
};

use crate::backlog::Entry;
use crate::{Parser, Start};

/// At most this many `#if ... #endif` chains in one modifier run.
const MAX_CHAINS: usize = 2;

/// Modifiers claimed for one declaration.
#[derive(Debug, Default)]
pub(crate) struct ModifierRun {
    pub(crate) modifiers: Modifiers,
    /// Layout of the first claimed item.
    pub(crate) start: Option<Start>,
    /// Column of the first modifier token.
    pub(crate) column: Option<u32>,
    /// Newlines before the first modifier token, for sandwiched runs.
    host_newlines: u32,
    prefix: Vec<NodeId>,
    /// Directive, anchor, newlines after it.
    postfix: Vec<(NodeId, u8, u32)>,
}

/// One item of a sandwiched run in rendered order.
#[derive(Copy, Clone, Debug)]
enum Piece {
    Directive { id: NodeId, synthesized: bool },
    Token { index: usize, moved: bool },
}

impl Parser {
    /// Claim the modifiers pending before the declaration head at the
    /// current token.
    pub(crate) fn take_modifiers(&mut self) -> ModifierRun {
        if let Some(run) = self.take_sandwiched() {
            return run;
        }
        self.take_plain()
    }

    /// Attach a claimed run's directives to declaration `id`.
    pub(crate) fn apply_modifiers(&mut self, id: NodeId, run: ModifierRun) {
        if run.prefix.is_empty() && run.postfix.is_empty() {
            return;
        }
        self.tree.set_newlines(id, run.host_newlines);
        for &ann in run.prefix.iter().rev() {
            self.tree
                .attach_annotation(id, ann, AnnotationPosition::Prefix, true);
        }
        for &(ann, anchor, end_newlines) in &run.postfix {
            if let Some(annotation) = self.tree.annotation_mut(ann) {
                annotation.anchor = anchor;
            }
            self.tree.format_mut(ann).set_end_newlines(end_newlines);
            self.tree
                .attach_annotation(id, ann, AnnotationPosition::Postfix, false);
        }
    }

    fn is_modifier_token(&self, entry: Entry) -> bool {
        match entry {
            Entry::Token(index) => {
                let kind = self.cursor.kind_at(index);
                kind.modifier().is_some() || kind == quill_ir::TokenKind::Ident
            }
            Entry::Node(_) => false,
        }
    }

    fn entry_directive(&self, entry: Entry) -> Option<&Directive> {
        match entry {
            Entry::Node(id) => self.tree.annotation(id)?.directive(),
            Entry::Token(_) => None,
        }
    }

    fn modifier_token(&mut self, index: usize) -> ModifierToken {
        let pos = self.cursor.token(index).pos;
        let trailing = self.cursor.take_trailing(index);
        self.stray.extend(trailing.into_iter().map(|c| (c, pos)));
        let token = self.cursor.token(index);
        match token.kind.modifier() {
            Some(modifier) => ModifierToken::Keyword(modifier),
            None => ModifierToken::Unknown(token.text.clone()),
        }
    }

    // === Plain runs ===

    fn take_plain(&mut self) -> ModifierRun {
        let pending = self.backlog.pending();
        let mut gap_after = self.cursor.current().newlines;
        let mut k = pending.len();
        while k > 0 && self.is_modifier_token(pending[k - 1]) && gap_after <= 1 {
            let Entry::Token(index) = pending[k - 1] else {
                break;
            };
            gap_after = self.cursor.token(index).newlines;
            k -= 1;
        }

        let mut run = ModifierRun::default();
        for entry in self.backlog.take_tail(k) {
            if let Entry::Token(index) = entry {
                if run.start.is_none() {
                    let start = self.start_at(index);
                    run.start = Some(start);
                    run.column = Some(start.pos.column);
                }
                let token = self.modifier_token(index);
                run.modifiers.push(token);
            }
        }
        run
    }

    // === Sandwiched runs ===

    /// Index into the pending entries where a sandwiched run starts, and
    /// where its trailing modifiers start.
    fn find_sandwich(&self) -> Option<(usize, usize)> {
        let pending = self.backlog.pending();
        let mut k = pending.len();
        while k > 0 && self.is_modifier_token(pending[k - 1]) {
            k -= 1;
        }
        let outer = k;

        let mut chains = 0;
        while chains < MAX_CHAINS && k > 0 {
            let closes = self
                .entry_directive(pending[k - 1])
                .is_some_and(|d| d.kind == DirectiveKind::Endif);
            if !closes {
                break;
            }
            let mut j = k - 1;
            let mut opened = false;
            while j > 0 {
                j -= 1;
                let entry = pending[j];
                if self.is_modifier_token(entry) {
                    continue;
                }
                match self.entry_directive(entry).map(|d| d.kind) {
                    Some(DirectiveKind::Else | DirectiveKind::Elif) => continue,
                    Some(DirectiveKind::If) => opened = true,
                    _ => {}
                }
                break;
            }
            if !opened {
                break;
            }
            chains += 1;
            k = j;
        }

        if chains == 0 {
            return None;
        }
        let has_content = pending[k..outer]
            .iter()
            .any(|&entry| self.is_modifier_token(entry));
        // Everything after the first `#if` touches the declaration head.
        let touching = self.cursor.current().newlines <= 1
            && pending[k + 1..]
                .iter()
                .all(|&entry| self.entry_newlines(entry) <= 1);
        (has_content && touching).then_some((k, outer))
    }

    fn take_sandwiched(&mut self) -> Option<ModifierRun> {
        let (first, outer) = self.find_sandwich()?;
        let head = self.start();
        let entries = self.backlog.take_tail(first);
        let (chain, outer_entries) = entries.split_at(outer - first);
        let outer_tokens: Vec<usize> = outer_entries
            .iter()
            .filter_map(|&e| match e {
                Entry::Token(index) => Some(index),
                Entry::Node(_) => None,
            })
            .collect();
        let outer_flags = outer_tokens
            .iter()
            .filter_map(|&i| self.cursor.kind_at(i).modifier())
            .fold(ModifierFlags::empty(), |acc, m| acc | m.flag());

        // The last chain starts at its `#if`.
        let last_chain = chain
            .iter()
            .rposition(|&e| self.entry_directive(e).is_some_and(|d| d.kind == DirectiveKind::If))
            .unwrap_or(0);
        let column = chain
            .iter()
            .find_map(|&e| match e {
                Entry::Token(index) => Some(self.cursor.token(index).pos.column),
                Entry::Node(_) => None,
            })
            .unwrap_or(head.pos.column);
        let indent = " ".repeat(column.saturating_sub(1) as usize);

        let mut pieces = Vec::with_capacity(chain.len() + outer_tokens.len() + 1);
        let mut active = false;
        let mut last_has_active = false;
        let mut last_has_else = false;
        let mut outer_placed = outer_tokens.is_empty();
        for (pos, &entry) in chain.iter().enumerate() {
            let in_last = pos >= last_chain;
            let (id, directive) = match entry {
                Entry::Token(index) => {
                    pieces.push(Piece::Token { index, moved: false });
                    continue;
                }
                Entry::Node(id) => match self.tree.annotation(id).and_then(Annotation::directive) {
                    Some(d) => (id, (d.kind, d.taken)),
                    None => continue,
                },
            };
            let (kind, taken) = directive;

            if in_last && active && kind != DirectiveKind::If && !outer_placed {
                push_moved(&mut pieces, &outer_tokens);
                outer_placed = true;
            }
            if in_last && kind == DirectiveKind::Endif && !outer_tokens.is_empty() && !last_has_else {
                let taken = !last_has_active;
                let synthesized = self.synthesize_else(taken, &indent, outer_flags, head);
                pieces.push(Piece::Directive {
                    id: synthesized,
                    synthesized: true,
                });
                if taken && !outer_placed {
                    push_moved(&mut pieces, &outer_tokens);
                    outer_placed = true;
                }
            }

            if kind.opens_branch() {
                active = taken;
                if in_last {
                    last_has_active |= taken;
                    last_has_else |= kind == DirectiveKind::Else;
                }
                if !taken {
                    let extra = if in_last { outer_flags } else { ModifierFlags::empty() };
                    self.rewrite_skipped(id, extra);
                }
            } else if kind == DirectiveKind::Endif {
                active = false;
            }
            pieces.push(Piece::Directive {
                id,
                synthesized: false,
            });
        }
        if !outer_placed {
            for &index in &outer_tokens {
                pieces.push(Piece::Token { index, moved: false });
            }
        }

        Some(self.resolve_pieces(&pieces, head))
    }

    /// `#else` standing in for the branch the source left out.
    fn synthesize_else(
        &mut self,
        taken: bool,
        indent: &str,
        outer_flags: ModifierFlags,
        head: Start,
    ) -> NodeId {
        let mut directive = Directive::new(DirectiveKind::Else, "");
        directive.taken = taken;
        if !taken {
            let mut text = String::from(indent);
            text.push_str(&outer_flags.canonical_text());
            directive.skipped = Some(text);
        }
        let mut annotation = Annotation::new(AnnotationKind::Directive(directive));
        annotation.flags.insert(AnnotationFlags::IS_FIRST_ON_LINE);
        tracing::trace!(taken, "synthesized #else for a conditional modifier run");
        self.tree.alloc_annotation(annotation, 1, head.pos)
    }

    /// Rewrite an inactive branch so its modifiers, plus `extra`, read in
    /// canonical order.
    fn rewrite_skipped(&mut self, id: NodeId, extra: ModifierFlags) {
        let Some(directive) = self
            .tree
            .annotation_mut(id)
            .and_then(Annotation::directive_mut)
        else {
            return;
        };
        let Some(skipped) = directive.skipped.as_deref() else {
            return;
        };
        let body = skipped.trim_start_matches([' ', '\t']);
        let indent = &skipped[..skipped.len() - body.len()];
        let (flags, rest) = split_leading_modifiers(body);
        let flags = flags | extra;
        if flags.is_empty() {
            return;
        }
        let mut text = String::from(indent);
        text.push_str(&flags.canonical_text());
        text.push_str(rest);
        directive.skipped = Some(text);
    }

    /// Split pieces into modifiers and prefix/postfix directives.
    fn resolve_pieces(&mut self, pieces: &[Piece], head: Start) -> ModifierRun {
        let gap_before = |p: &Parser, i: usize| -> u32 {
            match pieces.get(i) {
                None => head.newlines,
                Some(Piece::Directive { synthesized: true, .. }) => 1,
                Some(Piece::Directive { id, .. }) => u32::from(p.tree.get(*id).newlines()),
                Some(Piece::Token { moved: true, .. }) => {
                    let after_token = i > 0 && matches!(pieces[i - 1], Piece::Token { .. });
                    u32::from(!after_token)
                }
                Some(Piece::Token { index, .. }) => p.cursor.token(*index).newlines,
            }
        };

        let first_token = pieces
            .iter()
            .position(|p| matches!(p, Piece::Token { .. }))
            .unwrap_or(pieces.len());
        let mut run = ModifierRun {
            host_newlines: gap_before(self, first_token),
            ..ModifierRun::default()
        };
        run.modifiers.sandwiched = true;

        let mut tokens = 0u8;
        for (i, piece) in pieces.iter().enumerate() {
            if run.start.is_none() {
                run.start = Some(match *piece {
                    Piece::Directive { id, .. } => Start {
                        newlines: u32::from(self.tree.get(id).newlines()),
                        pos: self.tree.get(id).pos(),
                        space_before: false,
                    },
                    Piece::Token { index, .. } => self.start_at(index),
                });
            }
            match *piece {
                Piece::Directive { id, .. } if i < first_token => run.prefix.push(id),
                Piece::Directive { id, .. } => {
                    // A following directive brings its own line break.
                    let after = match pieces.get(i + 1) {
                        Some(Piece::Directive { .. }) => 0,
                        _ => gap_before(self, i + 1),
                    };
                    run.postfix.push((id, tokens, after));
                }
                Piece::Token { index, .. } => {
                    if run.column.is_none() {
                        run.column = Some(self.cursor.token(index).pos.column);
                    }
                    let token = self.modifier_token(index);
                    run.modifiers.push(token);
                    tokens = tokens.saturating_add(1);
                }
            }
        }
        run
    }
}

fn push_moved(pieces: &mut Vec<Piece>, tokens: &[usize]) {
    pieces.extend(tokens.iter().map(|&index| Piece::Token { index, moved: true }));
}

#[cfg(test)]
mod tests;
