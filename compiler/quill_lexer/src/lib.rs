//! Layout-preserving lexer for the Quill engine, built on logos.
//!
//! Produces a [`TokenList`] in which every token records the line breaks and
//! spacing before it and the comments after it on its line. Conditional
//! compilation is resolved here: inactive branches never reach the parser
//! and travel as text on the directive that opened them.

mod cooker;
mod directives;
mod keywords;
mod lex_error;
mod line_index;
mod raw_token;

use quill_ir::TokenList;

pub use lex_error::{LexError, LexErrorKind};

/// Lexer configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexConfig {
    /// Conditional compilation symbols defined before the first line.
    pub defines: Vec<Box<str>>,
}

impl LexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined symbol.
    #[must_use]
    pub fn with_define(mut self, symbol: impl Into<Box<str>>) -> Self {
        self.defines.push(symbol.into());
        self
    }
}

/// Result of lexing one source file.
#[derive(Clone, Debug)]
pub struct LexOutput {
    /// Always ends with [`TokenKind::Eof`](quill_ir::TokenKind::Eof), whose
    /// newline count is the number of line breaks ending the file.
    pub tokens: TokenList,
    pub errors: Vec<LexError>,
    /// The source uses `\r\n` line endings.
    pub crlf: bool,
}

/// Lex source code into a [`TokenList`].
pub fn lex(source: &str, config: &LexConfig) -> LexOutput {
    let output = cooker::TokenCooker::new(source, config).run();
    tracing::debug!(
        tokens = output.tokens.len(),
        errors = output.errors.len(),
        "lexed"
    );
    output
}
