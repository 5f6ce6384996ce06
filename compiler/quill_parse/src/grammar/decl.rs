//! Declarations: `using`, `namespace`, types, enums, attributes and members.

use quill_ir::{
    Annotation, AnnotationFlags, AnnotationKind, Block, CommentStyle, EnumDecl, FormatFlags,
    Method, Namespace, NodeId, NodeKind, Property, RunTokenKind, Token, TokenKind, TokenRun,
    TokenSet, TrailingComment, TypeDecl, TypeKeyword, UsingDirective, Variable,
};

use crate::backlog::Entry;
use crate::block::{BlockMode, BlockOutcome};
use crate::error::PResult;
use crate::grammar::{stmt, Context, Item, RunStop};
use crate::modifiers::ModifierRun;
use crate::{Parser, Start};

const SEMICOLON: TokenSet = TokenSet::single(TokenKind::Semicolon);
const BODY_START: TokenSet = TokenSet::single(TokenKind::LBrace).with(TokenKind::Semicolon);
const METHOD_TRAILER_END: TokenSet = BODY_START.with(TokenKind::Arrow);
const INIT_END: TokenSet = SEMICOLON.with(TokenKind::Comma);

/// Words lexed as identifiers that never start a type.
const NOT_TYPES: &[&str] = &[
    "await", "yield", "throw", "nameof", "typeof", "sizeof", "this", "base",
];

/// A member recognized by shape. `name` is the index of its name token.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Shape {
    Method { name: usize },
    Constructor { name: usize },
    Variable { name: usize },
    Property { name: usize },
}

fn is_type_word(token: &Token) -> bool {
    token.kind == TokenKind::Ident && !NOT_TYPES.contains(&&*token.text)
}

fn is_pointer(token: &Token) -> bool {
    token.kind == TokenKind::Op && &*token.text == "*"
}

impl Parser {
    /// What member starts at token `i`, if any.
    pub(crate) fn shape_at(&self, i: usize, context: Context) -> Option<Shape> {
        if !is_type_word(self.cursor.token(i)) {
            return None;
        }
        if context == Context::Type && self.cursor.kind_at(i + 1) == TokenKind::LParen {
            return Some(Shape::Constructor { name: i });
        }
        let name = self.scan_type(i)?;
        let name_token = self.cursor.token(name);
        if name_token.kind != TokenKind::Ident {
            return None;
        }
        let code = matches!(context, Context::Code | Context::Switch);
        match self.cursor.kind_at(name + 1) {
            TokenKind::LParen | TokenKind::Lt => Some(Shape::Method { name }),
            TokenKind::Eq | TokenKind::Semicolon | TokenKind::Comma => {
                Some(Shape::Variable { name })
            }
            TokenKind::LBrace | TokenKind::Arrow if !code => Some(Shape::Property { name }),
            TokenKind::LBracket if &*name_token.text == "this" => Some(Shape::Property { name }),
            _ => None,
        }
    }

    /// Index just past the type starting at `i`.
    fn scan_type(&self, i: usize) -> Option<usize> {
        if !is_type_word(self.cursor.token(i)) {
            return None;
        }
        let mut j = i + 1;
        loop {
            match self.cursor.kind_at(j) {
                TokenKind::Dot | TokenKind::ColonColon
                    if self.cursor.kind_at(j + 1) == TokenKind::Ident =>
                {
                    j += 2;
                }
                TokenKind::Lt => match self.scan_type_args(j) {
                    Some(end) => j = end,
                    None => break,
                },
                TokenKind::Question => j += 1,
                TokenKind::LBracket => {
                    let mut k = j + 1;
                    while self.cursor.kind_at(k) == TokenKind::Comma {
                        k += 1;
                    }
                    if self.cursor.kind_at(k) != TokenKind::RBracket {
                        break;
                    }
                    j = k + 1;
                }
                TokenKind::Op if is_pointer(self.cursor.token(j)) => j += 1,
                _ => break,
            }
        }
        Some(j)
    }

    /// Index just past the `<...>` starting at `i`, if it only holds types.
    fn scan_type_args(&self, i: usize) -> Option<usize> {
        let mut depth = 0u32;
        let mut j = i;
        loop {
            let token = self.cursor.token(j);
            match token.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(j + 1);
                    }
                }
                TokenKind::Ident
                | TokenKind::Comma
                | TokenKind::Dot
                | TokenKind::ColonColon
                | TokenKind::Question
                | TokenKind::LBracket
                | TokenKind::RBracket => {}
                TokenKind::Op if is_pointer(token) => {}
                _ => return None,
            }
            j += 1;
        }
    }

    /// Claim modifiers for the declaration whose head is the current
    /// token. Returns them with the declaration's start and the column
    /// its runs are measured from.
    fn declaration_start(&mut self) -> (ModifierRun, Start, u32) {
        let head = self.start();
        let run = self.take_modifiers();
        let start = run.start.unwrap_or(head);
        let base = run.column.unwrap_or(head.pos.column);
        (run, start, base)
    }

    fn declared_name(&mut self) -> Option<Box<str>> {
        if !self.cursor.check(TokenKind::Ident) {
            return None;
        }
        let index = self.bump_keep();
        Some(self.text(index))
    }

    fn optional_run(&mut self, stop: RunStop, base: u32) -> Option<TokenRun> {
        let run = self.collect_run(stop, base);
        (!run.is_empty()).then_some(run)
    }
}

/// `using System;`. `using (...)` is the statement form.
pub(super) fn using(p: &mut Parser, context: Context) -> PResult<Option<Item>> {
    let next = p.cursor.significant_from(p.cursor.position() + 1);
    if p.cursor.kind_at(next) == TokenKind::LParen {
        return stmt::compound(p, context);
    }
    if !context.declares_members() {
        return Ok(None);
    }
    let start = p.start();
    p.bump_keep();
    let target = p.collect_run(RunStop::statement(SEMICOLON), start.pos.column);
    let id = p.alloc_at(NodeKind::Using(UsingDirective { target }), start);
    p.expect_terminator(id);
    Ok(Some(Item::Statement(id)))
}

pub(super) fn namespace(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    p.bump_keep();
    let name = p.collect_run(RunStop::at(BODY_START), start.pos.column);
    let id = p.alloc_at(
        NodeKind::Namespace(Namespace {
            name,
            body: Block::unbraced(NodeId::NONE),
        }),
        start,
    );
    if p.parse_block(id, BlockMode::Required, Context::Namespace)? == BlockOutcome::Missing {
        p.error(id, "expected `{`");
    }
    Ok(Some(Item::Statement(id)))
}

/// `class`, `struct` or `interface`.
pub(super) fn type_decl(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let (mut modifiers, start, base) = p.declaration_start();
    let keyword = match p.cursor.current_kind() {
        TokenKind::Struct => TypeKeyword::Struct,
        TokenKind::Interface => TypeKeyword::Interface,
        _ => TypeKeyword::Class,
    };
    p.bump_keep();
    let name = p.declared_name();
    let type_params = p.cursor.check(TokenKind::Lt).then(|| {
        let mut run = TokenRun::new();
        p.collect_angle(&mut run, base);
        run
    });
    let trailer = p.optional_run(RunStop::at(BODY_START), base);

    let id = p.alloc_at(
        NodeKind::TypeDecl(TypeDecl {
            keyword,
            modifiers: std::mem::take(&mut modifiers.modifiers),
            name: name.clone().unwrap_or_default(),
            type_params,
            trailer,
            body: Block::unbraced(NodeId::NONE),
        }),
        start,
    );
    p.apply_modifiers(id, modifiers);
    if name.is_none() {
        p.error(id, "expected a type name");
    }
    if p.parse_block(id, BlockMode::Required, Context::Type)? == BlockOutcome::Missing {
        p.error(id, "expected `{`");
    }
    Ok(Some(Item::Statement(id)))
}

pub(super) fn enum_decl(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let (mut modifiers, start, base) = p.declaration_start();
    p.bump_keep();
    let name = p.declared_name();
    let trailer = p.optional_run(RunStop::at(BODY_START), base);
    let mut members = TokenRun::new();
    let has_members = p.cursor.check(TokenKind::LBrace);
    if has_members {
        p.collect_group(&mut members, base);
    }

    let id = p.alloc_at(
        NodeKind::EnumDecl(EnumDecl {
            modifiers: std::mem::take(&mut modifiers.modifiers),
            name: name.clone().unwrap_or_default(),
            trailer,
            members,
        }),
        start,
    );
    p.apply_modifiers(id, modifiers);
    if name.is_none() {
        p.error(id, "expected an enum name");
    }
    if !has_members {
        p.error(id, "expected `{`");
    }
    p.terminate(id);
    Ok(Some(Item::Statement(id)))
}

/// `[Attr]` sections on one line. They wait in the backlog for the
/// declaration they decorate.
pub(super) fn attribute(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    let first = p.cursor.position();
    let mut run = TokenRun::new();
    p.collect_group(&mut run, start.pos.column);
    while p.cursor.check(TokenKind::LBracket) && p.cursor.current().newlines == 0 {
        p.collect_group(&mut run, start.pos.column);
    }

    // Comments after the last `]` stay separate annotations.
    let mut comments = Vec::new();
    while run
        .tokens
        .last()
        .is_some_and(|t| t.kind == RunTokenKind::Comment)
    {
        if let Some(token) = run.tokens.pop() {
            comments.push(token);
        }
    }

    let mut annotation = Annotation::new(AnnotationKind::Attribute {
        text: run.text().into(),
    });
    if start.newlines > 0 || first == 0 {
        annotation.flags.insert(AnnotationFlags::IS_FIRST_ON_LINE);
    }
    let id = p.tree.alloc_annotation(annotation, start.newlines, start.pos);
    if start.newlines == 0 && !start.space_before {
        p.tree.format_mut(id).insert(FormatFlags::TIGHT);
    }

    let mut last = Entry::Node(id);
    for token in comments.into_iter().rev() {
        p.backlog.push(last);
        let style = if token.text.starts_with("//") {
            CommentStyle::Line
        } else {
            CommentStyle::Block
        };
        let comment = TrailingComment {
            is_eol: style == CommentStyle::Line,
            text: token.text,
            style,
            space_before: token.space_before,
        };
        last = Entry::Node(p.comment_annotation(comment, start.pos));
    }
    Ok(Some(Item::Pending(last)))
}

/// A member recognized by shape: method, constructor, field, local or
/// property.
pub(super) fn member(p: &mut Parser, context: Context) -> PResult<Option<Item>> {
    let Some(shape) = p.shape_at(p.cursor.position(), context) else {
        return Ok(None);
    };
    let (modifiers, start, base) = p.declaration_start();
    let id = match shape {
        Shape::Method { name } => method(p, Some(name), modifiers, start, base)?,
        Shape::Constructor { .. } => method(p, None, modifiers, start, base)?,
        Shape::Variable { name } => variable(p, name, modifiers, start, base),
        Shape::Property { name } => property(p, name, modifiers, start, base),
    };
    Ok(Some(Item::Statement(id)))
}

/// `T Name<U>(params) trailer { }`, `... => expr;` or `...;`. A
/// constructor has no return type.
fn method(
    p: &mut Parser,
    name: Option<usize>,
    mut modifiers: ModifierRun,
    start: Start,
    base: u32,
) -> PResult<NodeId> {
    let return_type = name.map(|name| p.collect_until(name, base));
    let name_index = p.bump_keep();
    let name = p.text(name_index);
    let type_params = p.cursor.check(TokenKind::Lt).then(|| {
        let mut run = TokenRun::new();
        p.collect_angle(&mut run, base);
        run
    });
    let mut params = TokenRun::new();
    let has_params = p.cursor.check(TokenKind::LParen);
    if has_params {
        p.collect_group(&mut params, base);
    }
    let mut trailer = p.collect_run(RunStop::at(METHOD_TRAILER_END), base);
    if p.cursor.check(TokenKind::Arrow) {
        let body = p.collect_run(RunStop::at(SEMICOLON), base);
        trailer.append(body);
    }

    let next = p.cursor.significant_from(p.cursor.position());
    let has_body = p.cursor.kind_at(next) == TokenKind::LBrace;
    let id = p.alloc_at(
        NodeKind::Method(Method {
            modifiers: std::mem::take(&mut modifiers.modifiers),
            return_type,
            name,
            type_params,
            params,
            trailer: (!trailer.is_empty()).then_some(trailer),
            body: has_body.then(|| Block::unbraced(NodeId::NONE)),
        }),
        start,
    );
    p.apply_modifiers(id, modifiers);
    if !has_params {
        p.error(id, "expected `(`");
    }
    if has_body {
        p.parse_block(id, BlockMode::Required, Context::Code)?;
    } else {
        p.expect_terminator(id);
    }
    Ok(id)
}

/// `T name = init, more;`
fn variable(
    p: &mut Parser,
    name: usize,
    mut modifiers: ModifierRun,
    start: Start,
    base: u32,
) -> NodeId {
    let ty = p.collect_until(name, base);
    let name_index = p.bump_keep();
    let name = p.text(name_index);
    let init = if p.eat(TokenKind::Eq) {
        p.operand(RunStop::at(INIT_END), base)
    } else {
        None
    };
    let trailer = if p.cursor.check(TokenKind::Comma) {
        p.optional_run(RunStop::at(SEMICOLON), base)
    } else {
        None
    };

    let id = p.alloc_at(
        NodeKind::Variable(Variable {
            modifiers: std::mem::take(&mut modifiers.modifiers),
            ty,
            name,
            trailer,
            init,
        }),
        start,
    );
    p.apply_modifiers(id, modifiers);
    p.expect_terminator(id);
    id
}

/// `T Name { get; set; } = init;`, `T Name => expr;` or an indexer
/// `T this[int i] { ... }`.
fn property(
    p: &mut Parser,
    name: usize,
    mut modifiers: ModifierRun,
    start: Start,
    base: u32,
) -> NodeId {
    let ty = p.collect_until(name, base);
    let name_index = p.bump_keep();
    let name = p.text(name_index);
    let mut accessors = TokenRun::new();
    if p.cursor.check(TokenKind::LBracket) {
        p.collect_group(&mut accessors, base);
    }
    if p.cursor.check(TokenKind::LBrace) {
        p.collect_group(&mut accessors, base);
    } else if p.cursor.check(TokenKind::Arrow) {
        let body = p.collect_run(RunStop::at(SEMICOLON), base);
        accessors.append(body);
    }
    let trailer = if p.cursor.check(TokenKind::Eq) {
        p.optional_run(RunStop::at(SEMICOLON), base)
    } else {
        None
    };

    let id = p.alloc_at(
        NodeKind::Property(Property {
            modifiers: std::mem::take(&mut modifiers.modifiers),
            ty,
            name,
            accessors,
            trailer,
        }),
        start,
    );
    p.apply_modifiers(id, modifiers);
    p.terminate(id);
    id
}
