//! Token cooking.
//!
//! Turns logos output into [`Token`]s carrying layout: the line breaks
//! before each token, whether a space precedes it, and the comments that
//! trail it on the same line.
//!
//! # Architecture
//!
//! ```text
//! source → RawToken (logos) → TokenCooker → TokenList
//! ```
//!
//! - **Newlines** are counted, not emitted. A token's `newlines` is the
//!   number of line breaks since the previous token.
//! - **Comments** on a line of their own become tokens. A comment that
//!   follows code on the same line is pushed onto that token's `trailing`
//!   list instead. Consecutive `///` lines merge into one doc comment token.
//! - **Directives** are evaluated. When a branch is inactive its lines are
//!   stored on the directive and logos restarts at the directive ending it.

use logos::Logos;
use quill_ir::{
    CommentStyle, Directive, DirectiveKind, Span, Token, TokenKind, TokenList, TrailingComment,
    MAX_NEWLINES,
};

use crate::directives::{evaluate, skip_inactive, split_directive, Conditions};
use crate::keywords;
use crate::lex_error::{LexError, LexErrorKind};
use crate::line_index::LineIndex;
use crate::raw_token::{Closed, RawToken};
use crate::{LexConfig, LexOutput};

pub(crate) struct TokenCooker<'src> {
    source: &'src str,
    lines: LineIndex,
    conditions: Conditions,
    tokens: TokenList,
    errors: Vec<LexError>,
    /// Line breaks since the last token.
    newlines: u32,
    /// The last trailing block comment ends its line unless another token
    /// follows on the same line.
    eol_pending: bool,
}

impl<'src> TokenCooker<'src> {
    pub(crate) fn new(source: &'src str, config: &LexConfig) -> Self {
        TokenCooker {
            source,
            lines: LineIndex::new(source),
            conditions: Conditions::new(config.defines.iter().map(|d| &**d)),
            tokens: TokenList::new(),
            errors: Vec::new(),
            newlines: 0,
            eol_pending: false,
        }
    }

    pub(crate) fn run(mut self) -> LexOutput {
        let source = self.source;
        let mut offset = 0;
        'scan: loop {
            let mut lexer = RawToken::lexer(&source[offset..]);
            while let Some(result) = lexer.next() {
                let range = lexer.span();
                let (start, end) = (offset + range.start, offset + range.end);
                match result {
                    Ok(RawToken::Newline) => self.newline(),
                    Ok(RawToken::Directive) => {
                        if let Some(resume) = self.directive(start, end) {
                            offset = resume;
                            continue 'scan;
                        }
                    }
                    Ok(raw) => self.cook(raw, start, end),
                    Err(()) => self.invalid(start, end),
                }
            }
            break;
        }
        self.finish()
    }

    fn cook(&mut self, raw: RawToken, start: usize, end: usize) {
        let source = self.source;
        let text = &source[start..end];
        match raw {
            RawToken::LineComment => self.line_comment(text.trim_end_matches('\r'), start, end),
            RawToken::BlockComment(Closed::Yes) => self.block_comment(text, start, end),
            RawToken::BlockComment(Closed::No) => {
                self.error(LexErrorKind::UnterminatedBlockComment, start, end);
                self.push(TokenKind::Error, text, start, end);
            }
            RawToken::VerbatimString(Closed::No) => {
                self.error(LexErrorKind::UnterminatedString, start, end);
                self.push(TokenKind::Error, text, start, end);
            }
            RawToken::UnterminatedString => {
                self.error(LexErrorKind::UnterminatedString, start, end);
                self.push(TokenKind::Error, text.trim_end_matches('\r'), start, end);
            }
            _ => {
                let kind = token_kind(raw, text);
                self.push(kind, text, start, end);
            }
        }
    }

    fn push(&mut self, kind: TokenKind, text: &str, start: usize, end: usize) {
        let token = self.token(kind, text, start, end);
        self.tokens.push(token);
    }

    /// A token at `start..end`, taking the pending line breaks.
    fn token(&mut self, kind: TokenKind, text: &str, start: usize, end: usize) -> Token {
        let mut token = Token::new(kind, text);
        token.newlines = std::mem::take(&mut self.newlines).min(u32::from(MAX_NEWLINES));
        token.space_before = self.space_before(start);
        token.pos = self.lines.position(self.source, start);
        token.span = Span::from_range(start..end);
        self.eol_pending = false;
        token
    }

    fn space_before(&self, start: usize) -> bool {
        start > 0 && matches!(self.source.as_bytes()[start - 1], b' ' | b'\t')
    }

    /// The token a same-line comment trails: the last token, if no line
    /// break intervened and it is code.
    fn trailing_host(&mut self) -> Option<&mut Token> {
        if self.newlines > 0 {
            return None;
        }
        self.tokens
            .last_mut()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Error)
    }

    fn line_comment(&mut self, text: &str, start: usize, end: usize) {
        let space_before = self.space_before(start);
        if let Some(host) = self.trailing_host() {
            host.trailing.push(TrailingComment {
                text: text.into(),
                style: CommentStyle::Line,
                is_eol: true,
                space_before,
            });
            self.eol_pending = false;
            return;
        }

        if is_doc_comment(text) {
            if self.newlines == 1 {
                if let Some(last) = self.tokens.last_mut().filter(|t| t.is(TokenKind::DocComment)) {
                    let mut merged = String::with_capacity(last.text.len() + 1 + text.len());
                    merged.push_str(&last.text);
                    merged.push('\n');
                    merged.push_str(text);
                    last.text = merged.into();
                    last.span = last.span.merge(Span::from_range(start..end));
                    self.newlines = 0;
                    return;
                }
            }
            self.push(TokenKind::DocComment, text, start, end);
            return;
        }

        self.push(TokenKind::LineComment, text, start, end);
    }

    fn block_comment(&mut self, text: &str, start: usize, end: usize) {
        let space_before = self.space_before(start);
        if let Some(host) = self.trailing_host() {
            host.trailing.push(TrailingComment {
                text: text.into(),
                style: CommentStyle::Block,
                is_eol: false,
                space_before,
            });
            self.eol_pending = true;
            return;
        }
        self.push(TokenKind::BlockComment, text, start, end);
    }

    fn newline(&mut self) {
        self.newlines += 1;
        self.settle_eol();
    }

    fn settle_eol(&mut self) {
        if std::mem::take(&mut self.eol_pending) {
            if let Some(comment) = self.tokens.last_mut().and_then(|t| t.trailing.last_mut()) {
                comment.is_eol = true;
            }
        }
    }

    /// Evaluate a directive line. Returns the offset to resume lexing at
    /// when the branch it opens is inactive.
    fn directive(&mut self, start: usize, end: usize) -> Option<usize> {
        let source = self.source;
        let line = source[start..end].trim_end_matches('\r');
        let (kind, argument) = split_directive(line);
        let mut directive = Directive::new(kind, argument);

        let taken = match kind {
            DirectiveKind::Define | DirectiveKind::Undef => {
                if let Some(symbol) = argument.split_whitespace().next() {
                    if kind == DirectiveKind::Define {
                        self.conditions.define(symbol);
                    } else {
                        self.conditions.undefine(symbol);
                    }
                }
                None
            }
            DirectiveKind::If => {
                let condition = self.condition(argument, start, end);
                Some(self.conditions.open_if(condition))
            }
            DirectiveKind::Elif => {
                let condition = self.condition(argument, start, end);
                let opened = self.conditions.open_elif(condition);
                self.branch(opened, start, end)
            }
            DirectiveKind::Else => {
                let opened = self.conditions.open_else();
                self.branch(opened, start, end)
            }
            DirectiveKind::Endif => {
                if let Err(kind) = self.conditions.close() {
                    self.error(kind, start, end);
                }
                None
            }
            _ => None,
        };

        let mut resume = None;
        match taken {
            Some(true) => directive.taken = true,
            Some(false) => {
                let body = if self.source[end..].starts_with('\n') {
                    end + 1
                } else {
                    end
                };
                let inactive = skip_inactive(self.source, body);
                if body < inactive.end {
                    let text = &self.source[body..inactive.end];
                    let text = text.strip_suffix('\n').unwrap_or(text);
                    directive.skipped = Some(text.replace('\r', ""));
                }
                tracing::trace!(
                    directive = %directive.line_text(),
                    bytes = inactive.end - body,
                    "skipped inactive branch"
                );
                resume = Some(inactive.end);
            }
            None => {}
        }

        let mut token = self.token(TokenKind::Directive, line, start, end);
        token.directive = Some(Box::new(directive));
        self.tokens.push(token);

        if let Some(resume) = resume {
            self.newlines = u32::from(resume > 0 && self.source.as_bytes()[resume - 1] == b'\n');
        }
        resume
    }

    fn branch(&mut self, opened: Result<bool, LexErrorKind>, start: usize, end: usize) -> Option<bool> {
        match opened {
            Ok(taken) => Some(taken),
            Err(kind) => {
                self.error(kind, start, end);
                None
            }
        }
    }

    fn condition(&mut self, expr: &str, start: usize, end: usize) -> bool {
        match evaluate(expr, self.conditions.symbols()) {
            Ok(value) => value,
            Err(reason) => {
                self.error(LexErrorKind::InvalidCondition { reason }, start, end);
                false
            }
        }
    }

    fn invalid(&mut self, start: usize, end: usize) {
        let source = self.source;
        let text = &source[start..end];
        let found = text.chars().next().unwrap_or('\0');
        self.error(LexErrorKind::InvalidCharacter { found }, start, end);
        self.push(TokenKind::Error, text, start, end);
    }

    fn error(&mut self, kind: LexErrorKind, start: usize, end: usize) {
        let pos = self.lines.position(self.source, start);
        tracing::debug!(line = pos.line, column = pos.column, %kind, "lex error");
        self.errors
            .push(LexError::new(kind, Span::from_range(start..end), pos));
    }

    fn finish(mut self) -> LexOutput {
        self.settle_eol();
        let end = self.source.len();
        if self.conditions.depth() > 0 {
            self.error(LexErrorKind::MissingEndif, end, end);
        }
        self.push(TokenKind::Eof, "", end, end);
        LexOutput {
            tokens: self.tokens,
            errors: self.errors,
            crlf: self.source.contains("\r\n"),
        }
    }
}

fn is_doc_comment(text: &str) -> bool {
    text.starts_with("///") && !text.starts_with("////")
}

/// Kind of a token that needs no layout handling.
fn token_kind(raw: RawToken, text: &str) -> TokenKind {
    match raw {
        RawToken::Ident => keywords::lookup(text).unwrap_or(TokenKind::Ident),
        RawToken::Number => {
            if is_real(text) {
                TokenKind::RealLit
            } else {
                TokenKind::IntLit
            }
        }
        RawToken::String | RawToken::VerbatimString(_) => TokenKind::StringLit,
        RawToken::Char => TokenKind::CharLit,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Eq => TokenKind::Eq,
        RawToken::FatArrow => TokenKind::Arrow,
        RawToken::Question => TokenKind::Question,
        RawToken::Op => TokenKind::Op,
        RawToken::LineComment => TokenKind::LineComment,
        RawToken::BlockComment(_) => TokenKind::BlockComment,
        RawToken::Directive => TokenKind::Directive,
        RawToken::Newline | RawToken::UnterminatedString => TokenKind::Error,
    }
}

fn is_real(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X' | b'b' | b'B') {
        return false;
    }
    text.contains('.')
        || text.contains(['e', 'E'])
        || text.ends_with(['f', 'F', 'd', 'D', 'm', 'M'])
}
