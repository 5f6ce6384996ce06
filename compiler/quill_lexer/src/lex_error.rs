//! Lexer error types.
//!
//! Lex errors never stop tokenization. Each one is recorded with its
//! location and the offending text becomes an [`Error`](quill_ir::TokenKind::Error)
//! token (or, for directive problems, the directive is kept as written).
//! The parser turns them into diagnostics on the tree.

use quill_ir::{Position, Span};

/// A lexer error with its location.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexError {
    pub span: Span,
    pub pos: Position,
    pub kind: LexErrorKind,
}

/// What went wrong.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum LexErrorKind {
    // === Literals and comments ===
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("invalid character {found:?}")]
    InvalidCharacter { found: char },

    // === Directives ===
    /// `#elif`, `#else` or `#endif` with no open `#if`.
    #[error("#{keyword} without matching #if")]
    UnmatchedDirective { keyword: &'static str },
    /// `#else` or `#elif` after the branch was already closed with `#else`.
    #[error("#{keyword} after #else")]
    BranchAfterElse { keyword: &'static str },
    /// End of file inside an `#if`.
    #[error("missing #endif")]
    MissingEndif,
    #[error("invalid preprocessor expression: {reason}")]
    InvalidCondition { reason: String },
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span, pos: Position) -> Self {
        LexError { span, pos, kind }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.pos.line, self.pos.column, self.kind)
    }
}
