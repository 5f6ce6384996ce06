//! Statement and declaration rules.
//!
//! Rules are looked up by the kind of the token that starts them
//! ([`rule_for`]). Declarations without a leading keyword (methods, fields,
//! properties, constructors, locals) are recognized by their shape: a type,
//! a name, then `(`, `=`, `;`, `{` or `=>`. Everything else is an
//! expression statement.
//!
//! A rule returns `Ok(None)` to decline, letting the next candidate try.

mod decl;
mod expr;
mod stmt;

use quill_ir::{AnnotationPosition, NodeId, TokenKind};

use crate::backlog::Entry;
use crate::error::PResult;
use crate::Parser;

pub(crate) use expr::RunStop;

/// What kind of block a statement sits in.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Context {
    /// Compilation unit or namespace body.
    Namespace,
    /// Class, struct or interface body.
    Type,
    /// Method body or nested statement.
    Code,
    /// `switch` body.
    Switch,
}

impl Context {
    /// Members here are declarations, so bare modifiers and constructors
    /// are expected.
    #[inline]
    fn declares_members(self) -> bool {
        matches!(self, Context::Namespace | Context::Type)
    }
}

/// Result of parsing one item.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Item {
    /// A finished statement, ready to commit.
    Statement(NodeId),
    /// Something that waits in the backlog.
    Pending(Entry),
}

pub(crate) type ParseRule = fn(&mut Parser, Context) -> PResult<Option<Item>>;

/// Rule for a statement starting with `kind`.
pub(crate) fn rule_for(kind: TokenKind) -> Option<ParseRule> {
    let rule: ParseRule = match kind {
        TokenKind::Using => decl::using,
        TokenKind::Namespace => decl::namespace,
        TokenKind::Class | TokenKind::Struct | TokenKind::Interface => decl::type_decl,
        TokenKind::Enum => decl::enum_decl,
        TokenKind::LBracket => decl::attribute,
        TokenKind::If => stmt::if_stmt,
        TokenKind::While => stmt::while_stmt,
        TokenKind::Do => stmt::do_while,
        TokenKind::For
        | TokenKind::Foreach
        | TokenKind::Lock
        | TokenKind::Fixed
        | TokenKind::Try
        | TokenKind::Catch
        | TokenKind::Finally => stmt::compound,
        TokenKind::Switch => stmt::switch,
        TokenKind::Case | TokenKind::Default => stmt::case_label,
        TokenKind::Return => stmt::return_stmt,
        TokenKind::Break | TokenKind::Continue => stmt::jump,
        TokenKind::Goto => stmt::goto,
        TokenKind::LBrace => stmt::block_stmt,
        TokenKind::Semicolon => stmt::empty,
        _ => return None,
    };
    Some(rule)
}

impl Parser {
    /// Parse one statement, declaration or pending fragment.
    pub(crate) fn parse_item(&mut self, context: Context) -> PResult<Item> {
        let kind = self.cursor.current_kind();
        if kind == TokenKind::Else || self.at_modifier(context) {
            let index = self.cursor.bump();
            return Ok(Item::Pending(Entry::Token(index)));
        }

        let mut item = None;
        if let Some(rule) = rule_for(kind) {
            item = rule(self, context)?;
        }
        if item.is_none() {
            item = decl::member(self, context)?;
        }
        if item.is_none() && !context.declares_members() {
            item = stmt::label(self, context)?;
        }
        let item = match item {
            Some(item) => item,
            None => expr::expression_statement(self)?,
        };

        if let Item::Statement(id) = item {
            self.attach_stray(id, AnnotationPosition::Eol);
        }
        Ok(item)
    }

    /// The current token is a modifier of a declaration that follows.
    fn at_modifier(&self, context: Context) -> bool {
        let i = self.cursor.position();
        let kind = self.cursor.kind_at(i);
        let next = self.cursor.significant_from(i + 1);
        if kind.modifier().is_some() {
            if kind == TokenKind::New || !context.declares_members() {
                return self.declaration_follows(next, context);
            }
            return true;
        }
        // A word this grammar does not know, e.g. `event` or `required`.
        kind == TokenKind::Ident
            && context.declares_members()
            && self.shape_at(i, context).is_none()
            && self.declaration_follows(next, context)
    }

    fn declaration_follows(&self, i: usize, context: Context) -> bool {
        let kind = self.cursor.kind_at(i);
        kind.modifier().is_some()
            || matches!(
                kind,
                TokenKind::Class | TokenKind::Struct | TokenKind::Interface | TokenKind::Enum
            )
            || self.shape_at(i, context).is_some()
    }
}
