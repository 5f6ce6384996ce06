//! Cooked tokens: the lexer's output and the parser's input.
//!
//! A [`Token`] carries everything the tree needs to reproduce the source
//! layout around it: the newline count before it, whether a space precedes it
//! on the same line, and any comments trailing it on the same line.

use std::fmt;

use crate::annotation::{CommentStyle, Directive};
use crate::modifiers::Modifier;
use crate::span::{Position, Span};

/// Token kind.
///
/// Fieldless so it can be used as a tag in [`TokenSet`] and in `match`
/// dispatch tables.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TokenKind {
    // === Literals and names ===
    Ident,
    IntLit,
    RealLit,
    StringLit,
    CharLit,

    // === Declaration keywords ===
    Using,
    Namespace,
    Class,
    Struct,
    Interface,
    Enum,

    // === Statement keywords ===
    If,
    Else,
    While,
    Do,
    For,
    Foreach,
    Switch,
    Case,
    Default,
    Return,
    Break,
    Continue,
    Goto,
    Try,
    Catch,
    Finally,
    Lock,
    Fixed,

    // === Modifier keywords ===
    Public,
    Protected,
    Internal,
    Private,
    New,
    Static,
    Const,
    Readonly,
    Volatile,
    Virtual,
    Abstract,
    Sealed,
    Override,
    Extern,
    Unsafe,
    Async,
    Partial,

    // === Punctuation ===
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    ColonColon,
    Comma,
    Dot,
    Lt,
    Gt,
    Eq,
    Arrow,
    Question,
    /// Any other operator.
    Op,

    // === Trivia ===
    LineComment,
    BlockComment,
    /// One or more consecutive `///` lines.
    DocComment,
    Directive,

    // === Special ===
    Error,
    Eof,
}

impl TokenKind {
    /// Number of kinds; every discriminant is below this.
    pub const COUNT: usize = TokenKind::Eof as usize + 1;

    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Comments and directives: skipped by the parser's cursor and turned
    /// into annotations.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
                | TokenKind::Directive
        )
    }

    #[inline]
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment
        )
    }

    /// The modifier this keyword spells, if any.
    pub const fn modifier(self) -> Option<Modifier> {
        Some(match self {
            TokenKind::Public => Modifier::Public,
            TokenKind::Protected => Modifier::Protected,
            TokenKind::Internal => Modifier::Internal,
            TokenKind::Private => Modifier::Private,
            TokenKind::New => Modifier::New,
            TokenKind::Static => Modifier::Static,
            TokenKind::Const => Modifier::Const,
            TokenKind::Readonly => Modifier::Readonly,
            TokenKind::Volatile => Modifier::Volatile,
            TokenKind::Virtual => Modifier::Virtual,
            TokenKind::Abstract => Modifier::Abstract,
            TokenKind::Sealed => Modifier::Sealed,
            TokenKind::Override => Modifier::Override,
            TokenKind::Extern => Modifier::Extern,
            TokenKind::Unsafe => Modifier::Unsafe,
            TokenKind::Async => Modifier::Async,
            TokenKind::Partial => Modifier::Partial,
            _ => return None,
        })
    }

    /// Keywords that begin a statement or declaration. An expression run
    /// that reaches one of these at the start of a line stops there.
    #[inline]
    pub const fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Using
                | TokenKind::Namespace
                | TokenKind::Class
                | TokenKind::Struct
                | TokenKind::Interface
                | TokenKind::Enum
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Goto
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
        )
    }

    /// Opening delimiter whose closer is tracked when collecting runs.
    #[inline]
    pub const fn is_open_delim(self) -> bool {
        matches!(
            self,
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace
        )
    }

    #[inline]
    pub const fn is_close_delim(self) -> bool {
        matches!(
            self,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
        )
    }
}

/// A comment trailing a token on the same line.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TrailingComment {
    pub text: Box<str>,
    pub style: CommentStyle,
    /// Last thing on the line (always true for `//` comments).
    pub is_eol: bool,
    pub space_before: bool,
}

/// A cooked token.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text. For [`TokenKind::DocComment`], the lines joined by `\n`.
    pub text: Box<str>,
    /// Line breaks between the previous token (or its trailing comments)
    /// and this one.
    pub newlines: u32,
    /// Whitespace precedes this token on its line.
    pub space_before: bool,
    pub pos: Position,
    pub span: Span,
    /// Same-line comments after this token.
    pub trailing: Vec<TrailingComment>,
    /// Set for [`TokenKind::Directive`].
    pub directive: Option<Box<Directive>>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<Box<str>>) -> Self {
        Token {
            kind,
            text: text.into(),
            newlines: 0,
            space_before: false,
            pos: Position::START,
            span: Span::DUMMY,
            trailing: Vec::new(),
            directive: None,
        }
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Trailing comment that ends the line, if any.
    pub fn eol_comment(&self) -> Option<&TrailingComment> {
        self.trailing.iter().find(|c| c.is_eol)
    }
}

/// The lexer's token stream. Always ends with [`TokenKind::Eof`].
#[derive(Clone, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.tokens.get_mut(index)
    }

    pub fn last_mut(&mut self) -> Option<&mut Token> {
        self.tokens.last_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Kinds only, for tests and debugging.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

impl std::ops::Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl fmt::Debug for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tokens.iter().map(|t| (t.kind, &t.text)))
            .finish()
    }
}

/// Bitset of token kinds, for terminator sets and recovery.
///
/// `u128` has room for every kind; `const fn` builders let sets be
/// declared as constants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    #[inline]
    pub const fn new() -> Self {
        TokenSet(0)
    }

    #[inline]
    pub const fn single(kind: TokenKind) -> Self {
        TokenSet(1u128 << kind.tag())
    }

    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        TokenSet(self.0 | (1u128 << kind.tag()))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: TokenSet) -> Self {
        TokenSet(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & (1u128 << kind.tag()) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSet({:#x})", self.0)
    }
}

// Every tag must fit in the set.
const _: () = assert!(TokenKind::COUNT <= 128);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_set_membership() {
        const SET: TokenSet = TokenSet::new()
            .with(TokenKind::Case)
            .with(TokenKind::Default)
            .with(TokenKind::RBrace);
        assert!(SET.contains(TokenKind::Case));
        assert!(SET.contains(TokenKind::RBrace));
        assert!(!SET.contains(TokenKind::LBrace));
        assert!(!TokenSet::EMPTY.contains(TokenKind::Eof));
        assert!(TokenSet::single(TokenKind::Eof).contains(TokenKind::Eof));
    }

    #[test]
    fn modifier_keywords_map_to_modifiers() {
        assert_eq!(TokenKind::Static.modifier(), Some(Modifier::Static));
        assert_eq!(TokenKind::Partial.modifier(), Some(Modifier::Partial));
        assert_eq!(TokenKind::Class.modifier(), None);
    }
}
