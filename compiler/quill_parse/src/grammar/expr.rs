//! Opaque token runs.
//!
//! Expressions, types, parameter lists and member bodies the engine does
//! not interpret are collected as [`TokenRun`]s. Collection tracks
//! delimiter depth only; a run ends at a stop token at depth zero, at a
//! closer it did not open, or at end of input.

use quill_ir::{NodeKind, TokenKind, TokenRun, TokenSet};

use crate::backlog::Entry;
use crate::error::PResult;
use crate::grammar::Item;
use crate::{Parser, Start};

/// Where a run ends.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RunStop {
    /// Stop before any of these at depth zero.
    pub(crate) stops: TokenSet,
    /// Also stop at a line that starts a new statement.
    pub(crate) statement: bool,
}

impl RunStop {
    pub(crate) const fn at(stops: TokenSet) -> Self {
        RunStop {
            stops,
            statement: false,
        }
    }

    pub(crate) const fn statement(stops: TokenSet) -> Self {
        RunStop {
            stops,
            statement: true,
        }
    }
}

const SEMICOLON: TokenSet = TokenSet::single(TokenKind::Semicolon);

impl Parser {
    /// Collect tokens up to `stop`. Offsets of tokens starting a line are
    /// relative to column `base`.
    pub(crate) fn collect_run(&mut self, stop: RunStop, base: u32) -> TokenRun {
        let mut run = TokenRun::new();
        let mut depth = 0u32;
        let mut after_brace = false;
        loop {
            let token = self.cursor.current();
            let kind = token.kind;
            if kind == TokenKind::Eof {
                break;
            }
            if depth == 0 {
                if stop.stops.contains(kind) || kind.is_close_delim() || kind.is_trivia() {
                    break;
                }
                let new_line = !run.is_empty() && token.newlines > 0;
                if stop.statement
                    && new_line
                    && (kind.starts_statement()
                        || (kind.modifier().is_some() && kind != TokenKind::New)
                        || after_brace)
                {
                    break;
                }
            }
            after_brace = false;
            if kind.is_open_delim() {
                depth += 1;
            } else if kind.is_close_delim() {
                depth -= 1;
                after_brace = depth == 0 && kind == TokenKind::RBrace;
            }
            let index = self.cursor.bump();
            self.push_run_token(&mut run, index, base);
        }
        run
    }

    /// Collect a balanced group starting at the current opener, delimiters
    /// included.
    pub(crate) fn collect_group(&mut self, run: &mut TokenRun, base: u32) {
        let mut depth = 0i32;
        loop {
            let kind = self.cursor.current_kind();
            if kind == TokenKind::Eof {
                break;
            }
            if kind.is_open_delim() {
                depth += 1;
            } else if kind.is_close_delim() {
                depth -= 1;
            }
            let index = self.cursor.bump();
            self.push_run_token(run, index, base);
            if depth <= 0 {
                break;
            }
        }
    }

    /// Collect `<...>` starting at the current `<`.
    pub(crate) fn collect_angle(&mut self, run: &mut TokenRun, base: u32) {
        let mut depth = 0i32;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::Eof | TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => {
                    break
                }
                _ => {}
            }
            let index = self.cursor.bump();
            self.push_run_token(run, index, base);
            if depth <= 0 {
                break;
            }
        }
    }

    /// Collect every token before index `end`.
    pub(crate) fn collect_until(&mut self, end: usize, base: u32) -> TokenRun {
        let mut run = TokenRun::new();
        while self.cursor.position() < end && !self.cursor.at_eof() {
            let index = self.cursor.bump();
            self.push_run_token(&mut run, index, base);
        }
        run
    }

    /// An expression operand on the statement's line, e.g. an initializer.
    pub(crate) fn operand(&mut self, stop: RunStop, base: u32) -> Option<quill_ir::NodeId> {
        let start = self.start();
        let run = self.collect_run(stop, base);
        if run.is_empty() {
            return None;
        }
        Some(self.alloc_at(NodeKind::Expression(run), Start { newlines: 0, ..start }))
    }

    /// A parenthesized operand, parentheses included. Reports and returns an
    /// empty operand if there is no `(`.
    pub(crate) fn paren_operand(&mut self, host: quill_ir::NodeId, base: u32) -> quill_ir::NodeId {
        let start = self.start();
        let mut run = TokenRun::new();
        if self.cursor.check(TokenKind::LParen) {
            self.collect_group(&mut run, base);
        } else {
            self.error(host, "expected `(`");
        }
        self.alloc_at(NodeKind::Expression(run), Start { newlines: 0, ..start })
    }
}

/// `expr;`, or a fragment left for the block engine when the `;` is
/// missing.
pub(super) fn expression_statement(p: &mut Parser) -> PResult<Item> {
    let start = p.start();
    let run = p.collect_run(RunStop::statement(SEMICOLON), start.pos.column);
    if run.is_empty() {
        let index = p.cursor.bump();
        return Ok(Item::Pending(Entry::Token(index)));
    }
    let id = p.alloc_at(NodeKind::Expression(run), start);
    if p.terminate(id) {
        Ok(Item::Statement(id))
    } else {
        Ok(Item::Pending(Entry::Node(id)))
    }
}
