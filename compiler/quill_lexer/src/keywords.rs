//! Keyword resolution.
//!
//! Every word lexes as an identifier first; this table turns reserved words
//! into keyword kinds. The identifier's length is checked first since all
//! keywords are 2-9 characters, and most identifiers are rejected there.
//!
//! Contextual words (`var`, `get`, `set`, `value`, `where`, ...) are not
//! listed: the grammar treats them as plain identifiers. A word escaped with
//! `@` is never a keyword.

use quill_ir::TokenKind;

/// Look up a reserved keyword by text.
#[inline]
pub(crate) fn lookup(text: &str) -> Option<TokenKind> {
    let bytes = text.as_bytes();
    let len = bytes.len();

    if !(2..=9).contains(&len) || !bytes[0].is_ascii_lowercase() {
        return None;
    }

    match len {
        2 => match text {
            "do" => Some(TokenKind::Do),
            "if" => Some(TokenKind::If),
            _ => None,
        },
        3 => match text {
            "for" => Some(TokenKind::For),
            "new" => Some(TokenKind::New),
            "try" => Some(TokenKind::Try),
            _ => None,
        },
        4 => match text {
            "case" => Some(TokenKind::Case),
            "else" => Some(TokenKind::Else),
            "enum" => Some(TokenKind::Enum),
            "goto" => Some(TokenKind::Goto),
            "lock" => Some(TokenKind::Lock),
            _ => None,
        },
        5 => match text {
            "async" => Some(TokenKind::Async),
            "break" => Some(TokenKind::Break),
            "catch" => Some(TokenKind::Catch),
            "class" => Some(TokenKind::Class),
            "const" => Some(TokenKind::Const),
            "fixed" => Some(TokenKind::Fixed),
            "using" => Some(TokenKind::Using),
            "while" => Some(TokenKind::While),
            _ => None,
        },
        6 => match text {
            "extern" => Some(TokenKind::Extern),
            "public" => Some(TokenKind::Public),
            "return" => Some(TokenKind::Return),
            "sealed" => Some(TokenKind::Sealed),
            "static" => Some(TokenKind::Static),
            "struct" => Some(TokenKind::Struct),
            "switch" => Some(TokenKind::Switch),
            "unsafe" => Some(TokenKind::Unsafe),
            _ => None,
        },
        7 => match text {
            "default" => Some(TokenKind::Default),
            "finally" => Some(TokenKind::Finally),
            "foreach" => Some(TokenKind::Foreach),
            "partial" => Some(TokenKind::Partial),
            "private" => Some(TokenKind::Private),
            "virtual" => Some(TokenKind::Virtual),
            _ => None,
        },
        8 => match text {
            "abstract" => Some(TokenKind::Abstract),
            "continue" => Some(TokenKind::Continue),
            "internal" => Some(TokenKind::Internal),
            "override" => Some(TokenKind::Override),
            "readonly" => Some(TokenKind::Readonly),
            "volatile" => Some(TokenKind::Volatile),
            _ => None,
        },
        9 => match text {
            "interface" => Some(TokenKind::Interface),
            "namespace" => Some(TokenKind::Namespace),
            "protected" => Some(TokenKind::Protected),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests;
