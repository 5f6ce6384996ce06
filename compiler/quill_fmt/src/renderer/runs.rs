//! Opaque token runs.

use quill_ir::{RunToken, RunTokenKind, TokenRun};

use super::Renderer;
use crate::writer::CodeWriter;

/// How the first token of a run is placed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(super) enum Lead {
    /// Right where output stands; the node already separated it.
    Head,
    /// After a space, on the current line.
    Word,
    /// As recorded: on a new line or after its own spacing.
    Inline,
}

impl<W: CodeWriter + ?Sized> Renderer<'_, '_, W> {
    pub(super) fn run(&mut self, run: &TokenRun, lead: Lead) {
        for (i, token) in run.tokens.iter().enumerate() {
            if i == 0 {
                match lead {
                    Lead::Head => {
                        self.run_text(token);
                        continue;
                    }
                    Lead::Word => {
                        self.space();
                        self.run_text(token);
                        continue;
                    }
                    Lead::Inline => {}
                }
            }
            self.run_token(token);
        }
    }

    fn run_token(&mut self, token: &RunToken) {
        if self.description {
            if matches!(token.kind, RunTokenKind::Comment | RunTokenKind::Verbatim) {
                return;
            }
            if token.space_before || token.newlines > 0 {
                self.space();
            }
            self.text(&token.text);
            return;
        }

        if token.newlines > 0 {
            self.lines(u32::from(token.newlines));
            if token.kind == RunTokenKind::Verbatim {
                self.run_text(token);
                return;
            }
            let column = i64::from(self.base) - 1 + i64::from(token.offset);
            let column = u32::try_from(column.max(0)).unwrap_or(0);
            self.w.begin_alignment(column);
            self.run_text(token);
            self.w.end_alignment();
            return;
        }
        if self.pending_break {
            self.lines(1);
        } else if token.space_before {
            self.space();
        }
        self.run_text(token);
    }

    /// The token's text, plus the line break a line comment or directive
    /// forces.
    fn run_text(&mut self, token: &RunToken) {
        match token.kind {
            RunTokenKind::Code => self.text(&token.text),
            RunTokenKind::Comment => {
                if self.description {
                    return;
                }
                self.text(&token.text);
                if token.text.starts_with("//") {
                    self.pending_break = true;
                }
            }
            RunTokenKind::Verbatim => {
                if self.description {
                    return;
                }
                self.text_at(0, &token.text);
                self.pending_break = true;
            }
        }
    }
}
