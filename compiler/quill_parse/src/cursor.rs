//! Token cursor.
//!
//! Owns the token list so trailing comments can be moved off tokens as they
//! are consumed. Trivia is not skipped: comments and directives are tokens
//! the block engine turns into annotations. The cursor never moves past the
//! final [`Eof`](TokenKind::Eof) token.

use quill_ir::{Position, Token, TokenKind, TokenList, TrailingComment};

pub(crate) struct Cursor {
    tokens: TokenList,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(mut tokens: TokenList) -> Self {
        if tokens.iter().last().map_or(true, |t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, ""));
        }
        Cursor { tokens, pos: 0 }
    }

    /// Index of the current token.
    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn current_pos(&self) -> Position {
        self.current().pos
    }

    #[inline]
    pub(crate) fn at_eof(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Token at `index`, or the final `Eof` past the end.
    #[inline]
    pub(crate) fn token(&self, index: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    #[inline]
    pub(crate) fn token_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.tokens.get_mut(index)
    }

    #[inline]
    pub(crate) fn kind_at(&self, index: usize) -> TokenKind {
        self.token(index).kind
    }

    /// True if the current token is `kind`.
    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Index of the first non-trivia token at or after `index`.
    pub(crate) fn significant_from(&self, index: usize) -> usize {
        let mut i = index;
        while self.kind_at(i).is_trivia() {
            i += 1;
        }
        i.min(self.tokens.len() - 1)
    }

    /// Consume the current token and return its index. At `Eof` the
    /// cursor stays put.
    pub(crate) fn bump(&mut self) -> usize {
        let index = self.pos;
        if self.tokens[index].kind != TokenKind::Eof {
            self.pos += 1;
        }
        index
    }

    /// Detach the comments trailing the token at `index`.
    pub(crate) fn take_trailing(&mut self, index: usize) -> Vec<TrailingComment> {
        self.tokens
            .get_mut(index)
            .map(|t| std::mem::take(&mut t.trailing))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_lexer::{lex, LexConfig};

    fn cursor(source: &str) -> Cursor {
        Cursor::new(lex(source, &LexConfig::default()).tokens)
    }

    #[test]
    fn bump_stops_at_eof() {
        let mut c = cursor("x");
        assert_eq!(c.bump(), 0);
        assert!(c.at_eof());
        assert_eq!(c.bump(), 1);
        assert!(c.at_eof());
    }

    #[test]
    fn significant_from_skips_comments() {
        let c = cursor("// a\n// b\nx");
        let i = c.significant_from(0);
        assert_eq!(c.kind_at(i), TokenKind::Ident);
    }

    #[test]
    fn lookahead_past_end_is_eof() {
        let c = cursor("x");
        assert_eq!(c.kind_at(100), TokenKind::Eof);
    }
}
