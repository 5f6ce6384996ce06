//! Conditional compilation.
//!
//! The lexer evaluates `#if`/`#elif` conditions as it goes and never
//! tokenizes an inactive branch. Instead the branch's raw lines are stored on
//! the directive that opened it, so the renderer can write them back
//! untouched and the modifier parser can rewrite them when a sandwiched
//! declaration changes.
//!
//! # Expressions
//!
//! ```text
//! or      = and ('||' and)*
//! and     = eq ('&&' eq)*
//! eq      = unary (('==' | '!=') unary)*
//! unary   = '!' unary | primary
//! primary = 'true' | 'false' | SYMBOL | '(' or ')'
//! ```

use logos::Logos;
use quill_ir::DirectiveKind;
use rustc_hash::FxHashSet;

use crate::lex_error::LexErrorKind;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")]
enum CondToken {
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("!")]
    Not,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[regex(r"//[^\n]*", logos::skip)]
    Comment,
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Symbol,
}

/// Evaluate a conditional expression against the defined symbols.
pub(crate) fn evaluate(expr: &str, symbols: &FxHashSet<Box<str>>) -> Result<bool, String> {
    let mut tokens = Vec::new();
    let mut lexer = CondToken::lexer(expr);
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push((token, lexer.slice())),
            Err(()) => return Err(format!("unexpected `{}`", lexer.slice())),
        }
    }
    let mut parser = CondParser {
        tokens,
        pos: 0,
        symbols,
    };
    let value = parser.or()?;
    match parser.tokens.get(parser.pos) {
        None => Ok(value),
        Some((_, text)) => Err(format!("unexpected `{text}`")),
    }
}

struct CondParser<'a> {
    tokens: Vec<(CondToken, &'a str)>,
    pos: usize,
    symbols: &'a FxHashSet<Box<str>>,
}

impl CondParser<'_> {
    fn eat(&mut self, kind: CondToken) -> bool {
        if self.tokens.get(self.pos).is_some_and(|(t, _)| *t == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<bool, String> {
        let mut value = self.and()?;
        while self.eat(CondToken::Or) {
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, String> {
        let mut value = self.eq()?;
        while self.eat(CondToken::And) {
            let rhs = self.eq()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn eq(&mut self) -> Result<bool, String> {
        let mut value = self.unary()?;
        loop {
            if self.eat(CondToken::EqEq) {
                value = value == self.unary()?;
            } else if self.eat(CondToken::NotEq) {
                value = value != self.unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<bool, String> {
        if self.eat(CondToken::Not) {
            return Ok(!self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<bool, String> {
        let Some(&(token, text)) = self.tokens.get(self.pos) else {
            return Err("expected an expression".to_string());
        };
        self.pos += 1;
        match token {
            CondToken::True => Ok(true),
            CondToken::False => Ok(false),
            CondToken::Symbol => Ok(self.symbols.contains(text)),
            CondToken::LParen => {
                let value = self.or()?;
                if self.eat(CondToken::RParen) {
                    Ok(value)
                } else {
                    Err("expected `)`".to_string())
                }
            }
            _ => Err(format!("unexpected `{text}`")),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    /// Some branch of this `#if` chain was taken.
    taken: bool,
    seen_else: bool,
}

/// Defined symbols plus the stack of open `#if` chains.
#[derive(Clone, Debug, Default)]
pub(crate) struct Conditions {
    symbols: FxHashSet<Box<str>>,
    frames: Vec<Frame>,
}

impl Conditions {
    pub(crate) fn new<'a>(defines: impl IntoIterator<Item = &'a str>) -> Self {
        Conditions {
            symbols: defines.into_iter().map(Box::from).collect(),
            frames: Vec::new(),
        }
    }

    pub(crate) fn symbols(&self) -> &FxHashSet<Box<str>> {
        &self.symbols
    }

    pub(crate) fn define(&mut self, symbol: &str) {
        self.symbols.insert(symbol.into());
    }

    pub(crate) fn undefine(&mut self, symbol: &str) {
        self.symbols.remove(symbol);
    }

    /// Open `#if` chains.
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// `#if`: returns whether its branch is taken.
    pub(crate) fn open_if(&mut self, condition: bool) -> bool {
        self.frames.push(Frame {
            taken: condition,
            seen_else: false,
        });
        condition
    }

    /// `#elif`: taken only if no earlier branch was.
    pub(crate) fn open_elif(&mut self, condition: bool) -> Result<bool, LexErrorKind> {
        let frame = self.top("elif")?;
        let taken = !frame.taken && condition;
        frame.taken |= taken;
        Ok(taken)
    }

    /// `#else`: taken only if no earlier branch was.
    pub(crate) fn open_else(&mut self) -> Result<bool, LexErrorKind> {
        let frame = self.top("else")?;
        let taken = !frame.taken;
        frame.taken = true;
        frame.seen_else = true;
        Ok(taken)
    }

    pub(crate) fn close(&mut self) -> Result<(), LexErrorKind> {
        self.frames
            .pop()
            .map(|_| ())
            .ok_or(LexErrorKind::UnmatchedDirective { keyword: "endif" })
    }

    fn top(&mut self, keyword: &'static str) -> Result<&mut Frame, LexErrorKind> {
        let frame = self
            .frames
            .last_mut()
            .ok_or(LexErrorKind::UnmatchedDirective { keyword })?;
        if frame.seen_else {
            return Err(LexErrorKind::BranchAfterElse { keyword });
        }
        Ok(frame)
    }
}

/// End of an inactive branch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Inactive {
    /// Byte offset of the line holding the directive that ends the branch,
    /// or the end of the source.
    pub(crate) end: usize,
    /// A closing `#elif`, `#else` or `#endif` was found.
    pub(crate) closed: bool,
}

/// Find where the inactive branch starting at `from` (a line start) ends.
/// Nested `#if` chains inside the branch are skipped whole.
pub(crate) fn skip_inactive(source: &str, from: usize) -> Inactive {
    let mut depth = 0usize;
    let mut line_start = from;
    while line_start < source.len() {
        let line_end = source[line_start..]
            .find('\n')
            .map_or(source.len(), |i| line_start + i);
        if let Some(rest) = source[line_start..line_end].trim_start().strip_prefix('#') {
            match directive_keyword(rest) {
                "if" => depth += 1,
                "endif" | "elif" | "else" if depth == 0 => {
                    return Inactive {
                        end: line_start,
                        closed: true,
                    };
                }
                "endif" => depth -= 1,
                _ => {}
            }
        }
        line_start = line_end + 1;
    }
    Inactive {
        end: source.len(),
        closed: false,
    }
}

fn directive_keyword(text: &str) -> &str {
    let text = text.trim_start();
    let len = text
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    &text[..len]
}

/// Split a directive line into its kind and trimmed argument. For
/// [`DirectiveKind::Other`] the argument keeps the unknown keyword.
pub(crate) fn split_directive(line: &str) -> (DirectiveKind, &str) {
    let body = line.strip_prefix('#').unwrap_or(line).trim_start();
    let keyword = directive_keyword(body);
    let kind = DirectiveKind::from_keyword(keyword);
    let argument = if kind == DirectiveKind::Other {
        body
    } else {
        &body[keyword.len()..]
    };
    (kind, argument.trim())
}
