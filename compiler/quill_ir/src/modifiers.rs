//! Declaration modifiers.
//!
//! [`Modifiers`] keeps the modifier tokens in source order so a parsed
//! declaration renders exactly as written. Programmatic insertions go to the
//! canonical slot given by [`Modifier::ALL`]. Keywords this engine does not
//! know are kept in place as [`ModifierToken::Unknown`].

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

/// A modifier keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Modifier {
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
}

impl Modifier {
    /// Every modifier in canonical rendering order.
    pub const ALL: [Modifier; 17] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Internal,
        Modifier::Private,
        Modifier::New,
        Modifier::Static,
        Modifier::Const,
        Modifier::Readonly,
        Modifier::Volatile,
        Modifier::Virtual,
        Modifier::Abstract,
        Modifier::Sealed,
        Modifier::Override,
        Modifier::Extern,
        Modifier::Unsafe,
        Modifier::Async,
        Modifier::Partial,
    ];

    pub const fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Internal => "internal",
            Modifier::Private => "private",
            Modifier::New => "new",
            Modifier::Static => "static",
            Modifier::Const => "const",
            Modifier::Readonly => "readonly",
            Modifier::Volatile => "volatile",
            Modifier::Virtual => "virtual",
            Modifier::Abstract => "abstract",
            Modifier::Sealed => "sealed",
            Modifier::Override => "override",
            Modifier::Extern => "extern",
            Modifier::Unsafe => "unsafe",
            Modifier::Async => "async",
            Modifier::Partial => "partial",
        }
    }

    pub fn from_keyword(text: &str) -> Option<Modifier> {
        Modifier::ALL.into_iter().find(|m| m.keyword() == text)
    }

    /// Position in [`Modifier::ALL`].
    #[inline]
    pub const fn rank(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn flag(self) -> ModifierFlags {
        ModifierFlags::from_bits_truncate(1 << (self as u32))
    }
}

bitflags! {
    /// Set of modifiers, one bit per [`Modifier`] in canonical order.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ModifierFlags: u32 {
        // === Access ===
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const INTERNAL = 1 << 2;
        const PRIVATE = 1 << 3;

        // === Storage ===
        const NEW = 1 << 4;
        const STATIC = 1 << 5;
        const CONST = 1 << 6;
        const READONLY = 1 << 7;
        const VOLATILE = 1 << 8;

        // === Inheritance ===
        const VIRTUAL = 1 << 9;
        const ABSTRACT = 1 << 10;
        const SEALED = 1 << 11;
        const OVERRIDE = 1 << 12;

        // === Other ===
        const EXTERN = 1 << 13;
        const UNSAFE = 1 << 14;
        const ASYNC = 1 << 15;
        const PARTIAL = 1 << 16;
    }
}

impl ModifierFlags {
    /// Access modifiers.
    pub const ACCESS_MASK: Self = Self::from_bits_truncate(
        Self::PUBLIC.bits() | Self::PROTECTED.bits() | Self::INTERNAL.bits() | Self::PRIVATE.bits(),
    );

    /// Modifiers in canonical order.
    pub fn modifiers(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(move |m| self.contains(m.flag()))
    }

    /// Canonical text, each keyword followed by one space
    /// (`"private static "`).
    pub fn canonical_text(self) -> String {
        let mut text = String::new();
        for modifier in self.modifiers() {
            text.push_str(modifier.keyword());
            text.push(' ');
        }
        text
    }
}

/// One modifier token as written.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ModifierToken {
    Keyword(Modifier),
    /// A modifier-shaped word this engine does not recognize.
    Unknown(Box<str>),
}

impl ModifierToken {
    pub fn text(&self) -> &str {
        match self {
            ModifierToken::Keyword(m) => m.keyword(),
            ModifierToken::Unknown(text) => text,
        }
    }
}

/// Modifier list of a declaration.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct Modifiers {
    tokens: SmallVec<[ModifierToken; 4]>,
    /// Modifiers are interleaved with conditional directives; the renderer
    /// places postfix directives between tokens by their anchor.
    pub sandwiched: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from flags in canonical order.
    pub fn from_flags(flags: ModifierFlags) -> Self {
        Modifiers {
            tokens: flags.modifiers().map(ModifierToken::Keyword).collect(),
            sandwiched: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[ModifierToken] {
        &self.tokens
    }

    /// Known modifiers as a set.
    pub fn flags(&self) -> ModifierFlags {
        self.tokens
            .iter()
            .fold(ModifierFlags::empty(), |acc, token| match token {
                ModifierToken::Keyword(m) => acc | m.flag(),
                ModifierToken::Unknown(_) => acc,
            })
    }

    #[inline]
    pub fn contains(&self, modifier: Modifier) -> bool {
        self.tokens
            .iter()
            .any(|t| *t == ModifierToken::Keyword(modifier))
    }

    /// Append a token in source order.
    pub fn push(&mut self, token: ModifierToken) {
        self.tokens.push(token);
    }

    /// Insert a token at the front (used when scanning backwards).
    pub fn push_front(&mut self, token: ModifierToken) {
        self.tokens.insert(0, token);
    }

    /// Add `modifier` at its canonical slot. No-op if already present.
    ///
    /// The slot is after the last known keyword that sorts before it, so
    /// unknown tokens keep their place relative to their neighbors.
    pub fn insert(&mut self, modifier: Modifier) {
        if self.contains(modifier) {
            return;
        }
        let index = self
            .tokens
            .iter()
            .rposition(|t| matches!(t, ModifierToken::Keyword(m) if m.rank() < modifier.rank()))
            .map_or(0, |i| i + 1);
        self.tokens.insert(index, ModifierToken::Keyword(modifier));
    }

    /// Remove `modifier`. Returns whether it was present.
    pub fn remove(&mut self, modifier: Modifier) -> bool {
        let before = self.tokens.len();
        self.tokens.retain(|t| *t != ModifierToken::Keyword(modifier));
        before != self.tokens.len()
    }

    /// Tokens joined by single spaces, no trailing space.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(token.text());
        }
        text
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifiers({:?}", self.text())?;
        if self.sandwiched {
            write!(f, ", sandwiched")?;
        }
        write!(f, ")")
    }
}

/// Split leading modifier keywords off `text`.
///
/// Returns the set of modifiers found and the remainder, which starts at the
/// first non-modifier word (leading spaces and tabs removed, line breaks
/// kept). Used to rewrite the inactive branch of a conditional modifier run.
pub fn split_leading_modifiers(text: &str) -> (ModifierFlags, &str) {
    let mut flags = ModifierFlags::empty();
    let mut rest = text;
    loop {
        let trimmed = rest.trim_start();
        let word_len = trimmed
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(trimmed.len());
        match Modifier::from_keyword(&trimmed[..word_len]) {
            Some(modifier) if word_len > 0 => {
                flags |= modifier.flag();
                rest = &trimmed[word_len..];
            }
            _ => break,
        }
    }
    (flags, rest.trim_start_matches([' ', '\t']))
}
