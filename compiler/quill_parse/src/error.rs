//! Fatal parse errors.
//!
//! Source problems never stop the parser: they become diagnostics on the
//! tree. A [`ParseError`] means the parser itself had to give up on a file.
//! [`parse`](crate::parse) catches it, logs it, and returns a tree holding
//! the whole file as unrecognized text plus one error on the root.

use quill_ir::Position;

/// Why parsing a file was abandoned.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum ParseError {
    /// Blocks nested deeper than [`ParseConfig::max_nesting`](crate::ParseConfig::max_nesting).
    #[error("{pos}: blocks nested deeper than {limit} levels")]
    TooDeeplyNested { limit: u32, pos: Position },
    /// A grammar rule needed a token after the end of input.
    #[error("{pos}: unexpected end of input")]
    UnexpectedEof { pos: Position },
}

pub(crate) type PResult<T> = Result<T, ParseError>;
