//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before keyword
//! resolution and layout bookkeeping. Keywords are not listed here: every
//! word lexes as [`RawToken::Ident`] and [`crate::keywords::lookup`] decides.

use logos::{Lexer, Logos};

/// Whether a block comment found its closing `*/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Closed {
    Yes,
    No,
}

fn block_comment(lex: &mut Lexer<'_, RawToken>) -> Closed {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Closed::Yes
        }
        None => {
            lex.bump(lex.remainder().len());
            Closed::No
        }
    }
}

/// Scan a verbatim string body up to the `"` that is not doubled.
fn verbatim_string(lex: &mut Lexer<'_, RawToken>) -> Closed {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        if rest[i] == b'"' {
            if rest.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            lex.bump(i + 1);
            return Closed::Yes;
        }
        i += 1;
    }
    lex.bump(rest.len());
    Closed::No
}

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f\u{FEFF}]+")] // Horizontal whitespace and stray BOMs
pub(crate) enum RawToken {
    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment(Closed),

    /// A whole directive line, `#` through the end of the line.
    #[regex(r"#[^\n]*")]
    Directive,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("<")]
    Lt,
    // `>>` is never a single token, so nested generic argument lists close
    // one `>` at a time. Spacing keeps shifts intact on output.
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("=>")]
    FatArrow,
    #[token("?")]
    Question,

    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("<<")]
    #[token("<<=")]
    #[token("&&")]
    #[token("||")]
    #[token("??")]
    #[token("??=")]
    #[token("?.")]
    #[token("->")]
    #[token("++")]
    #[token("--")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("!")]
    #[token("~")]
    Op,

    // Decimal, hex and binary literals with optional type suffixes.
    // Whether it is integral is decided by the cooker.
    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?[a-zA-Z]*")]
    #[regex(r"0[xX][0-9a-fA-F_]+[uUlL]*")]
    #[regex(r"0[bB][01_]+[uUlL]*")]
    Number,

    // Regular and interpolated strings (no unescaped newlines allowed)
    #[regex(r#"\$?"([^"\\\n]|\\.)*""#)]
    String,

    // Verbatim strings may span lines; `""` escapes a quote.
    #[token("@\"", verbatim_string)]
    #[token("$@\"", verbatim_string)]
    #[token("@$\"", verbatim_string)]
    VerbatimString(Closed),

    /// Opening quote with no closing quote on the line.
    #[regex(r#"\$?"([^"\\\n]|\\.)*"#)]
    UnterminatedString,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    Char,

    // Identifier, with `@` for escaped keywords
    #[regex(r"@?[\p{L}_][\p{L}\p{N}_]*")]
    Ident,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(source: &str) -> Vec<RawToken> {
        RawToken::lexer(source).filter_map(Result::ok).collect()
    }

    #[test]
    fn shifts_split_into_single_angles() {
        assert_eq!(
            raw("a >> b"),
            vec![RawToken::Ident, RawToken::Gt, RawToken::Gt, RawToken::Ident]
        );
    }

    #[test]
    fn block_comment_reports_missing_close() {
        assert_eq!(raw("/* a */"), vec![RawToken::BlockComment(Closed::Yes)]);
        assert_eq!(raw("/* a"), vec![RawToken::BlockComment(Closed::No)]);
    }

    #[test]
    fn directive_takes_the_rest_of_the_line() {
        let mut lexer = RawToken::lexer("#if DEBUG // x\nfoo");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Directive)));
        assert_eq!(lexer.slice(), "#if DEBUG // x");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Newline)));
    }

    #[test]
    fn verbatim_strings_span_lines() {
        let mut lexer = RawToken::lexer("@\"a\n\"\"b\"\"\" x");
        assert_eq!(lexer.next(), Some(Ok(RawToken::VerbatimString(Closed::Yes))));
        assert_eq!(lexer.slice(), "@\"a\n\"\"b\"\"\"");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Ident)));
    }

    #[test]
    fn verbatim_strings_with_doubled_quotes() {
        let mut lexer = RawToken::lexer("s = @\"x\"\"y\";");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Ident)));
        assert_eq!(lexer.next(), Some(Ok(RawToken::Eq)));
        assert_eq!(lexer.next(), Some(Ok(RawToken::VerbatimString(Closed::Yes))));
        assert_eq!(lexer.slice(), "@\"x\"\"y\"");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Semicolon)));

        let mut lexer = RawToken::lexer("$@\"{a}\"\"\" @$\"\"");
        assert_eq!(lexer.next(), Some(Ok(RawToken::VerbatimString(Closed::Yes))));
        assert_eq!(lexer.slice(), "$@\"{a}\"\"\"");
        assert_eq!(lexer.next(), Some(Ok(RawToken::VerbatimString(Closed::Yes))));
        assert_eq!(lexer.slice(), "@$\"\"");
    }

    #[test]
    fn verbatim_string_reports_missing_close() {
        assert_eq!(raw("@\"abc\n\"\""), vec![RawToken::VerbatimString(Closed::No)]);
    }

    #[test]
    fn numbers_keep_suffixes() {
        let mut lexer = RawToken::lexer("1.5f 0xFFu 10_000L");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Number)));
        assert_eq!(lexer.slice(), "1.5f");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Number)));
        assert_eq!(lexer.slice(), "0xFFu");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Number)));
        assert_eq!(lexer.slice(), "10_000L");
    }
}
