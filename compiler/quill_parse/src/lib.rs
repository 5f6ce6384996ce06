//! Layout-preserving parser for the Quill engine.
//!
//! Builds a [`Tree`] straight from the lexer's tokens. Every node records
//! the newlines before it, its braces and the comments and directives
//! around it, so rendering an unedited tree gives back the source.
//!
//! # Architecture
//!
//! - [`block`]: the block engine. Parses the statements of one block,
//!   holds back comments, directives and fragments in the [`backlog`]
//!   until it knows where they belong, then reattaches leading comments.
//! - [`grammar`]: statement and declaration rules, dispatched statically
//!   by token kind. Expressions, types and parameter lists are kept as
//!   opaque token runs.
//! - [`modifiers`]: resolves a declaration's modifier keywords from the
//!   backlog, including modifiers that differ between `#if` branches.
//!
//! Source errors become diagnostics on the tree; [`parse`] never fails.

mod backlog;
mod block;
mod cursor;
mod error;
mod grammar;
mod modifiers;
mod stack;

use quill_ir::{
    Annotation, AnnotationFlags, AnnotationKind, AnnotationPosition, CommentStyle, Directive,
    DirectiveKind, FormatFlags, NodeId, NodeKind, Position, RunToken, RunTokenKind, Severity,
    TokenKind, TokenRun, TrailingComment, Tree, TreeSettings,
};
use quill_lexer::{LexConfig, LexOutput};

use backlog::Backlog;
use block::BlockMode;
use cursor::Cursor;
use grammar::Context;

pub use error::ParseError;

use error::PResult;

/// Parser configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseConfig {
    /// Normalize braces and blank lines after each block is parsed.
    /// Off by default, so an unedited tree renders as the source.
    pub auto_cleanup: bool,
    /// Deepest block nesting accepted before giving up on the file.
    pub max_nesting: u32,
    pub lex: LexConfig,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            auto_cleanup: false,
            max_nesting: 256,
            lex: LexConfig::default(),
        }
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_auto_cleanup(mut self, auto_cleanup: bool) -> Self {
        self.auto_cleanup = auto_cleanup;
        self
    }

    #[must_use]
    pub fn with_max_nesting(mut self, max_nesting: u32) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Add a conditional compilation symbol.
    #[must_use]
    pub fn with_define(mut self, symbol: impl Into<Box<str>>) -> Self {
        self.lex = self.lex.with_define(symbol);
        self
    }
}

/// Result of parsing one file.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    pub tree: Tree,
    /// Set if the parser gave up; the tree then holds the file as one
    /// unrecognized node.
    pub fatal: Option<ParseError>,
}

/// Parse `source` into a tree. Never fails: problems are attached to the
/// tree as diagnostics.
pub fn parse(source: &str, config: &ParseConfig) -> ParseOutput {
    let lexed = quill_lexer::lex(source, &config.lex);
    let settings = TreeSettings {
        auto_cleanup: config.auto_cleanup,
        crlf: lexed.crlf,
    };
    let lex_errors = lexed.errors.clone();

    let mut parser = Parser::new(lexed, settings, config);
    let (mut tree, fatal) = match parser.parse_root() {
        Ok(()) => (parser.tree, None),
        Err(err) => {
            tracing::error!(%err, "parse failed; keeping the file as unrecognized text");
            (fallback_tree(source, settings, config, &err), Some(err))
        }
    };

    let root = tree.root();
    for error in &lex_errors {
        tree.attach_message(root, Severity::Error, error.to_string());
    }
    tracing::debug!(
        nodes = tree.len(),
        errors = tree.diagnostic_counts().errors,
        "parsed"
    );
    ParseOutput { tree, fatal }
}

/// The whole file as one unrecognized node, plus an error on the root.
fn fallback_tree(source: &str, settings: TreeSettings, config: &ParseConfig, err: &ParseError) -> Tree {
    let lexed = quill_lexer::lex(source, &config.lex);
    let mut parser = Parser::new(lexed, settings, config);
    let root = parser.tree.root();
    let first = parser.cursor.current().clone();
    let mut run = TokenRun::new();
    while !parser.cursor.at_eof() {
        let index = parser.cursor.bump();
        parser.push_run_token(&mut run, index, 1);
    }
    let end_newlines = parser.cursor.current().newlines;
    let mut tree = parser.tree;
    if !run.is_empty() {
        let id = tree.alloc_parsed(NodeKind::Unrecognized(run), first.newlines, first.pos);
        tree.set_parent(id, root);
        if let Some(block) = tree.block_mut(root) {
            block.push_parsed(id);
        }
    }
    if let Some(block) = tree.block_mut(root) {
        block.format_mut().set_end_newlines(end_newlines);
    }
    tree.attach_message(root, Severity::Error, err.to_string());
    tree
}

/// Where a node starts: the layout of its first token.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Start {
    pub(crate) newlines: u32,
    pub(crate) pos: Position,
    pub(crate) space_before: bool,
}

/// Parser state for one file.
pub(crate) struct Parser {
    pub(crate) cursor: Cursor,
    pub(crate) tree: Tree,
    pub(crate) backlog: Backlog,
    /// Comments trailing header tokens, waiting for their node.
    stray: Vec<(TrailingComment, Position)>,
    max_nesting: u32,
    depth: u32,
}

impl Parser {
    fn new(lexed: LexOutput, settings: TreeSettings, config: &ParseConfig) -> Self {
        Parser {
            cursor: Cursor::new(lexed.tokens),
            tree: Tree::for_source(settings),
            backlog: Backlog::new(),
            stray: Vec::new(),
            max_nesting: config.max_nesting,
            depth: 0,
        }
    }

    fn parse_root(&mut self) -> PResult<()> {
        let root = self.tree.root();
        self.parse_block(root, BlockMode::ToEof, Context::Namespace)?;
        Ok(())
    }

    // === Token helpers ===

    /// Consume the current token, keeping its trailing comments for the
    /// node being built (see [`attach_stray`](Self::attach_stray)).
    pub(crate) fn bump_keep(&mut self) -> usize {
        let index = self.cursor.bump();
        let pos = self.cursor.token(index).pos;
        let trailing = self.cursor.take_trailing(index);
        self.stray.extend(trailing.into_iter().map(|c| (c, pos)));
        index
    }

    /// Consume the current token if it is `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.cursor.check(kind) {
            self.bump_keep();
            true
        } else {
            false
        }
    }

    /// Text of the token at `index`.
    pub(crate) fn text(&self, index: usize) -> Box<str> {
        self.cursor.token(index).text.clone()
    }

    /// Layout of the current token, for the node it starts.
    pub(crate) fn start(&self) -> Start {
        let token = self.cursor.current();
        Start {
            newlines: token.newlines,
            pos: token.pos,
            space_before: token.space_before,
        }
    }

    /// Layout of the token at `index`.
    pub(crate) fn start_at(&self, index: usize) -> Start {
        let token = self.cursor.token(index);
        Start {
            newlines: token.newlines,
            pos: token.pos,
            space_before: token.space_before,
        }
    }

    /// Allocate a parsed node laid out as `start`.
    pub(crate) fn alloc_at(&mut self, kind: NodeKind, start: Start) -> NodeId {
        let id = self.tree.alloc_parsed(kind, start.newlines, start.pos);
        if start.newlines == 0 && !start.space_before {
            self.tree.format_mut(id).insert(FormatFlags::TIGHT);
        }
        id
    }

    // === Annotations ===

    /// Attach the comments collected by [`bump_keep`](Self::bump_keep) to
    /// `host`.
    pub(crate) fn attach_stray(&mut self, host: NodeId, position: AnnotationPosition) {
        for (comment, pos) in std::mem::take(&mut self.stray) {
            let ann = self.comment_annotation(comment, pos);
            self.tree.attach_annotation(host, ann, position, false);
        }
    }

    pub(crate) fn comment_annotation(&mut self, comment: TrailingComment, pos: Position) -> NodeId {
        let tight = !comment.space_before;
        let ann = Annotation::new(AnnotationKind::Comment {
            text: comment.text,
            style: comment.style,
        });
        let id = self.tree.alloc_annotation(ann, 0, pos);
        if tight {
            self.tree.format_mut(id).insert(FormatFlags::TIGHT);
        }
        id
    }

    /// Turn the current comment or directive token into an unattached
    /// annotation node.
    pub(crate) fn trivia_annotation(&mut self) -> NodeId {
        let index = self.cursor.bump();
        let directive = self
            .cursor
            .token_mut(index)
            .and_then(|token| token.directive.take());
        let token = self.cursor.token(index);
        let (newlines, pos, space_before) = (token.newlines, token.pos, token.space_before);
        let text = token.text.clone();
        let kind = match token.kind {
            TokenKind::BlockComment => AnnotationKind::Comment {
                text,
                style: CommentStyle::Block,
            },
            TokenKind::DocComment => AnnotationKind::DocComment {
                lines: text
                    .split('\n')
                    .map(|line| line.trim_end_matches('\r').into())
                    .collect(),
            },
            TokenKind::Directive => AnnotationKind::Directive(directive.map_or_else(
                || Directive::new(DirectiveKind::Other, text.trim_start_matches('#')),
                |d| *d,
            )),
            _ => AnnotationKind::Comment {
                text,
                style: CommentStyle::Line,
            },
        };
        let is_directive = matches!(kind, AnnotationKind::Directive(_));
        let mut annotation = Annotation::new(kind);
        if newlines > 0 || index == 0 {
            annotation.flags.insert(AnnotationFlags::IS_FIRST_ON_LINE);
        }
        let id = self.tree.alloc_annotation(annotation, newlines, pos);
        let format = self.tree.format_mut(id);
        if is_directive && pos.column == 1 {
            format.insert(FormatFlags::NO_INDENTATION);
        }
        if newlines == 0 && !space_before {
            format.insert(FormatFlags::TIGHT);
        }
        id
    }

    /// Consume a `;` ending `id`. Its trailing comments become end-of-line
    /// annotations. Returns whether one was there.
    pub(crate) fn terminate(&mut self, id: NodeId) -> bool {
        if !self.cursor.check(TokenKind::Semicolon) {
            self.attach_stray(id, AnnotationPosition::Eol);
            self.tree.set_terminator(id, false);
            return false;
        }
        let index = self.cursor.bump();
        self.attach_stray(id, AnnotationPosition::Eol);
        self.tree.set_terminator(id, true);
        if let Some(token) = self.cursor.token_mut(index) {
            self.tree.move_eol_comment(id, token, true);
        }
        true
    }

    /// Like [`terminate`](Self::terminate), reporting a missing `;`.
    pub(crate) fn expect_terminator(&mut self, id: NodeId) {
        if !self.terminate(id) {
            self.error(id, "expected `;`");
        }
    }

    pub(crate) fn error(&mut self, host: NodeId, text: impl Into<Box<str>>) {
        let text = text.into();
        tracing::trace!(?host, %text, "syntax error");
        self.tree.attach_message(host, Severity::Error, text);
    }

    // === Runs ===

    /// Append the token at `index` (and any comments trailing it) to `run`.
    /// Tokens starting a line record their column relative to `base`.
    pub(crate) fn push_run_token(&mut self, run: &mut TokenRun, index: usize, base: u32) {
        let token = self.cursor.token(index);
        let newlines = clamp_newlines(token.newlines);
        let offset = if newlines > 0 {
            column_offset(token.pos.column, base)
        } else {
            0
        };
        let (kind, text) = match token.kind {
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::DocComment => {
                (RunTokenKind::Comment, token.text.clone())
            }
            TokenKind::Directive => (RunTokenKind::Verbatim, verbatim_directive(token)),
            _ => (RunTokenKind::Code, token.text.clone()),
        };
        run.push(RunToken {
            text,
            kind,
            newlines,
            space_before: token.space_before,
            offset,
        });
        for comment in self.cursor.take_trailing(index) {
            run.push(RunToken {
                text: comment.text,
                kind: RunTokenKind::Comment,
                newlines: 0,
                space_before: comment.space_before,
                offset: 0,
            });
        }
    }
}

/// A directive inside a run: its line as written plus any inactive
/// source it guards.
fn verbatim_directive(token: &quill_ir::Token) -> Box<str> {
    let mut text = " ".repeat(token.pos.column.saturating_sub(1) as usize);
    text.push_str(&token.text);
    if let Some(skipped) = token.directive.as_ref().and_then(|d| d.skipped.as_ref()) {
        text.push('\n');
        text.push_str(skipped);
    }
    text.into()
}

pub(crate) fn clamp_newlines(newlines: u32) -> u8 {
    u8::try_from(newlines)
        .unwrap_or(quill_ir::MAX_NEWLINES)
        .min(quill_ir::MAX_NEWLINES)
}

pub(crate) fn column_offset(column: u32, base: u32) -> i16 {
    let offset = i64::from(column) - i64::from(base);
    i16::try_from(offset).unwrap_or(if offset < 0 { i16::MIN } else { i16::MAX })
}
