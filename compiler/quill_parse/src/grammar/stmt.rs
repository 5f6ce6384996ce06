//! Control-flow statements.
//!
//! Conditions and headers are kept as opaque runs, parentheses included.
//! Bodies go through the block engine, which decides between braces, a
//! lone `;` and a single statement.

use quill_ir::{
    AnnotationPosition, Block, Case, Compound, CompoundKeyword, DoWhile, Else, Goto, If, Label,
    NodeId, NodeKind, Return, Switch, TokenKind, TokenRun, TokenSet, While,
};

use crate::block::{BlockMode, BlockOutcome};
use crate::error::PResult;
use crate::grammar::{Context, Item, RunStop};
use crate::{clamp_newlines, Parser};

const SEMICOLON: TokenSet = TokenSet::single(TokenKind::Semicolon);
const CASE_END: TokenSet = TokenSet::single(TokenKind::Case)
    .with(TokenKind::Default)
    .with(TokenKind::RBrace);

impl Parser {
    /// Parse the body of a control statement, reporting a body that is
    /// missing altogether.
    fn statement_body(&mut self, id: NodeId, mode: BlockMode) -> PResult<()> {
        match self.parse_block(id, mode, Context::Code)? {
            BlockOutcome::Parsed => {}
            BlockOutcome::Missing => self.error(id, "expected `{`"),
            BlockOutcome::Collapsed => self.error(id, "expected statement"),
        }
        Ok(())
    }

    /// Parse `(...)` after the keyword of `id` and store it as its
    /// condition.
    fn condition(&mut self, id: NodeId, base: u32) {
        let condition = self.paren_operand(id, base);
        match self.tree.kind_mut(id) {
            NodeKind::If(s) => s.condition = condition,
            NodeKind::While(s) => s.condition = condition,
            NodeKind::DoWhile(s) => s.condition = condition,
            NodeKind::Switch(s) => s.value = condition,
            _ => {}
        }
        self.tree.set_parent(condition, id);
    }
}

pub(super) fn if_stmt(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    p.bump_keep();
    let id = p.alloc_at(
        NodeKind::If(If {
            condition: NodeId::NONE,
            body: Block::unbraced(NodeId::NONE),
            else_clause: None,
        }),
        start,
    );
    p.condition(id, start.pos.column);
    p.statement_body(id, BlockMode::Optional)?;

    let next = p.cursor.significant_from(p.cursor.position());
    if p.cursor.kind_at(next) == TokenKind::Else {
        let mut leading = Vec::new();
        while p.cursor.position() < next {
            leading.push(p.trivia_annotation());
        }
        let else_start = p.start();
        p.bump_keep();
        let else_id = p.alloc_at(
            NodeKind::Else(Else {
                body: Block::unbraced(NodeId::NONE),
            }),
            else_start,
        );
        for ann in leading.into_iter().rev() {
            p.tree
                .attach_annotation(else_id, ann, AnnotationPosition::Prefix, true);
        }
        p.statement_body(else_id, BlockMode::Optional)?;
        if let NodeKind::If(s) = p.tree.kind_mut(id) {
            s.else_clause = Some(else_id);
        }
        p.tree.set_parent(else_id, id);
    }
    Ok(Some(Item::Statement(id)))
}

pub(super) fn while_stmt(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    p.bump_keep();
    let id = p.alloc_at(
        NodeKind::While(While {
            condition: NodeId::NONE,
            body: Block::unbraced(NodeId::NONE),
        }),
        start,
    );
    p.condition(id, start.pos.column);
    p.statement_body(id, BlockMode::Optional)?;
    Ok(Some(Item::Statement(id)))
}

/// `do body while (cond);`
pub(super) fn do_while(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    p.bump_keep();
    let id = p.alloc_at(
        NodeKind::DoWhile(DoWhile {
            body: Block::unbraced(NodeId::NONE),
            condition: NodeId::NONE,
            while_newlines: 0,
        }),
        start,
    );
    p.statement_body(id, BlockMode::Optional)?;

    let next = p.cursor.significant_from(p.cursor.position());
    if p.cursor.kind_at(next) != TokenKind::While {
        p.error(id, "expected `while`");
        return Ok(Some(Item::Statement(id)));
    }
    // Anchor 1 places these before `while` rather than before the body.
    while p.cursor.position() < next {
        let ann = p.trivia_annotation();
        if let Some(annotation) = p.tree.annotation_mut(ann) {
            annotation.anchor = 1;
        }
        p.tree
            .attach_annotation(id, ann, AnnotationPosition::Infix, false);
    }
    let newlines = p.cursor.current().newlines;
    p.bump_keep();
    if let NodeKind::DoWhile(s) = p.tree.kind_mut(id) {
        s.while_newlines = clamp_newlines(newlines);
    }
    p.condition(id, start.pos.column);
    p.expect_terminator(id);
    Ok(Some(Item::Statement(id)))
}

/// `for`, `foreach`, `using (...)`, `lock`, `fixed`, `try`, `catch` and
/// `finally`.
pub(super) fn compound(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let keyword = match p.cursor.current_kind() {
        TokenKind::For => CompoundKeyword::For,
        TokenKind::Foreach => CompoundKeyword::Foreach,
        TokenKind::Using => CompoundKeyword::Using,
        TokenKind::Lock => CompoundKeyword::Lock,
        TokenKind::Fixed => CompoundKeyword::Fixed,
        TokenKind::Try => CompoundKeyword::Try,
        TokenKind::Catch => CompoundKeyword::Catch,
        TokenKind::Finally => CompoundKeyword::Finally,
        _ => return Ok(None),
    };
    let start = p.start();
    let base = start.pos.column;
    p.bump_keep();

    let mut header = TokenRun::new();
    if p.cursor.check(TokenKind::LParen) {
        p.collect_group(&mut header, base);
    }
    // `catch (E e) when (filter)`
    if keyword == CompoundKeyword::Catch
        && p.cursor.check(TokenKind::Ident)
        && &*p.cursor.current().text == "when"
    {
        let index = p.cursor.bump();
        p.push_run_token(&mut header, index, base);
        if p.cursor.check(TokenKind::LParen) {
            p.collect_group(&mut header, base);
        }
    }

    let needs_header = !matches!(
        keyword,
        CompoundKeyword::Try | CompoundKeyword::Catch | CompoundKeyword::Finally
    );
    let missing_header = needs_header && header.is_empty();
    let mode = if needs_header {
        BlockMode::Optional
    } else {
        BlockMode::Required
    };
    let id = p.alloc_at(
        NodeKind::Compound(Compound {
            keyword,
            header: (!header.is_empty()).then_some(header),
            body: Block::unbraced(NodeId::NONE),
        }),
        start,
    );
    if missing_header {
        p.error(id, "expected `(`");
    }
    p.statement_body(id, mode)?;
    Ok(Some(Item::Statement(id)))
}

pub(super) fn switch(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    p.bump_keep();
    let id = p.alloc_at(
        NodeKind::Switch(Switch {
            value: NodeId::NONE,
            body: Block::unbraced(NodeId::NONE),
        }),
        start,
    );
    p.condition(id, start.pos.column);
    if p.parse_block(id, BlockMode::Required, Context::Switch)? == BlockOutcome::Missing {
        p.error(id, "expected `{`");
    }
    Ok(Some(Item::Statement(id)))
}

/// `case value:` or `default:` and the statements up to the next label.
pub(super) fn case_label(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let kind = p.cursor.current_kind();
    let after = p.cursor.significant_from(p.cursor.position() + 1);
    if kind == TokenKind::Default && p.cursor.kind_at(after) != TokenKind::Colon {
        // `default(T)` or `default;`
        return Ok(None);
    }
    let start = p.start();
    p.bump_keep();
    let value = (kind == TokenKind::Case).then(|| {
        p.collect_run(
            RunStop::at(TokenSet::single(TokenKind::Colon)),
            start.pos.column,
        )
    });
    let id = p.alloc_at(
        NodeKind::Case(Case {
            value,
            body: Block::unbraced(NodeId::NONE),
        }),
        start,
    );
    if !p.eat(TokenKind::Colon) {
        p.error(id, "expected `:`");
    }
    p.parse_block(id, BlockMode::Terminated(CASE_END), Context::Code)?;
    Ok(Some(Item::Statement(id)))
}

pub(super) fn return_stmt(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    p.bump_keep();
    let value = p.operand(RunStop::statement(SEMICOLON), start.pos.column);
    let id = p.alloc_at(NodeKind::Return(Return { value }), start);
    p.expect_terminator(id);
    Ok(Some(Item::Statement(id)))
}

/// `break;` or `continue;`
pub(super) fn jump(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    let kind = match p.cursor.current_kind() {
        TokenKind::Break => NodeKind::Break,
        _ => NodeKind::Continue,
    };
    p.bump_keep();
    let id = p.alloc_at(kind, start);
    p.expect_terminator(id);
    Ok(Some(Item::Statement(id)))
}

pub(super) fn goto(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    p.bump_keep();
    let target = p.collect_run(RunStop::statement(SEMICOLON), start.pos.column);
    let id = p.alloc_at(NodeKind::Goto(Goto { target }), start);
    p.expect_terminator(id);
    Ok(Some(Item::Statement(id)))
}

/// A nested `{ ... }`.
pub(super) fn block_stmt(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    let id = p.alloc_at(NodeKind::BlockStmt(Block::unbraced(NodeId::NONE)), start);
    p.parse_block(id, BlockMode::Required, Context::Code)?;
    Ok(Some(Item::Statement(id)))
}

/// A lone `;`.
pub(super) fn empty(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let start = p.start();
    let index = p.cursor.bump();
    let id = p.alloc_at(NodeKind::Empty, start);
    if let Some(token) = p.cursor.token_mut(index) {
        p.tree.move_eol_comment(id, token, true);
    }
    Ok(Some(Item::Statement(id)))
}

/// `name:` in a method body.
pub(super) fn label(p: &mut Parser, _context: Context) -> PResult<Option<Item>> {
    let i = p.cursor.position();
    if p.cursor.kind_at(i) != TokenKind::Ident || p.cursor.kind_at(i + 1) != TokenKind::Colon {
        return Ok(None);
    }
    let start = p.start();
    let name_index = p.bump_keep();
    let name = p.text(name_index);
    p.bump_keep();
    let id = p.alloc_at(NodeKind::Label(Label { name }), start);
    Ok(Some(Item::Statement(id)))
}
