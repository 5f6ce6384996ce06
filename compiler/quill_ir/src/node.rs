//! Tree nodes.
//!
//! A [`Node`] is the common header (parent link, annotations, format state,
//! source position) plus a [`NodeKind`] payload. Payloads that the engine
//! does not interpret (types, parameter lists, expression internals) are
//! stored as [`TokenRun`]s: the original tokens with their spacing, so they
//! render exactly as written.

use crate::annotation::Annotation;
use crate::block::{Block, BracePolicy};
use crate::format::FormatState;
use crate::modifiers::Modifiers;
use crate::node_id::NodeId;
use crate::span::Position;

/// How a token inside a run is rendered.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RunTokenKind {
    Code,
    Comment,
    /// Written without indentation (directive lines inside a run).
    Verbatim,
}

/// One token of an opaque run.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RunToken {
    pub text: Box<str>,
    pub kind: RunTokenKind,
    pub newlines: u8,
    pub space_before: bool,
    /// For tokens starting a line: column offset from the start of the
    /// enclosing statement.
    pub offset: i16,
}

impl RunToken {
    pub fn code(text: impl Into<Box<str>>, space_before: bool) -> Self {
        RunToken {
            text: text.into(),
            kind: RunTokenKind::Code,
            newlines: 0,
            space_before,
            offset: 0,
        }
    }
}

/// Tokens kept verbatim.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TokenRun {
    pub tokens: Vec<RunToken>,
}

impl TokenRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single opaque token; the text renders unchanged.
    pub fn from_text(text: impl Into<Box<str>>) -> Self {
        TokenRun {
            tokens: vec![RunToken::code(text, false)],
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

    pub fn push(&mut self, token: RunToken) {
        self.tokens.push(token);
    }

    /// Append another run. Its first token keeps its own spacing.
    pub fn append(&mut self, other: TokenRun) {
        self.tokens.extend(other.tokens);
    }

    pub fn first(&self) -> Option<&RunToken> {
        self.tokens.first()
    }

    /// True if any token after the first starts a new line.
    pub fn is_multiline(&self) -> bool {
        self.tokens.iter().skip(1).any(|t| t.newlines > 0)
    }

    /// The run on one line, tokens separated as in the source
    /// (line breaks become single spaces).
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 && (token.space_before || token.newlines > 0) {
                text.push(' ');
            }
            text.push_str(&token.text);
        }
        text
    }
}

/// Coarse node classification.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Category {
    Root,
    Statement,
    Expression,
    Annotation,
    Unrecognized,
    Disposed,
}

/// `class`, `struct` or `interface`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKeyword {
    Class,
    Struct,
    Interface,
}

impl TypeKeyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            TypeKeyword::Class => "class",
            TypeKeyword::Struct => "struct",
            TypeKeyword::Interface => "interface",
        }
    }
}

/// Keyword of a statement that is a keyword, an optional parenthesized
/// header and a body.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompoundKeyword {
    For,
    Foreach,
    Using,
    Lock,
    Fixed,
    Try,
    Catch,
    Finally,
}

impl CompoundKeyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            CompoundKeyword::For => "for",
            CompoundKeyword::Foreach => "foreach",
            CompoundKeyword::Using => "using",
            CompoundKeyword::Lock => "lock",
            CompoundKeyword::Fixed => "fixed",
            CompoundKeyword::Try => "try",
            CompoundKeyword::Catch => "catch",
            CompoundKeyword::Finally => "finally",
        }
    }

    const fn brace_policy(self) -> BracePolicy {
        match self {
            CompoundKeyword::Try | CompoundKeyword::Catch | CompoundKeyword::Finally => {
                BracePolicy::Required
            }
            _ => BracePolicy::Optional,
        }
    }
}

/// `using System.Text;` or `using X = Y;`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct UsingDirective {
    pub target: TokenRun,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Namespace {
    pub name: TokenRun,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeDecl {
    pub keyword: TypeKeyword,
    pub modifiers: Modifiers,
    pub name: Box<str>,
    /// `<T, U>`
    pub type_params: Option<TokenRun>,
    /// Base list and constraints, e.g. `: Base where T : new()`.
    pub trailer: Option<TokenRun>,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EnumDecl {
    pub modifiers: Modifiers,
    pub name: Box<str>,
    /// `: byte`
    pub trailer: Option<TokenRun>,
    /// Members including the braces.
    pub members: TokenRun,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Method {
    pub modifiers: Modifiers,
    /// `None` for constructors.
    pub return_type: Option<TokenRun>,
    pub name: Box<str>,
    pub type_params: Option<TokenRun>,
    /// Parameter list, parentheses included.
    pub params: TokenRun,
    /// Constructor initializer, constraints or `=> expr`.
    pub trailer: Option<TokenRun>,
    /// `None` for abstract, interface and expression-bodied members.
    pub body: Option<Block>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Property {
    pub modifiers: Modifiers,
    pub ty: TokenRun,
    pub name: Box<str>,
    /// Accessor list including the braces.
    pub accessors: TokenRun,
    /// Initializer after the accessors, e.g. `= new()`.
    pub trailer: Option<TokenRun>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Variable {
    pub modifiers: Modifiers,
    pub ty: TokenRun,
    pub name: Box<str>,
    /// Further declarators or array suffixes, e.g. `, y`.
    pub trailer: Option<TokenRun>,
    pub init: Option<NodeId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct If {
    pub condition: NodeId,
    pub body: Block,
    pub else_clause: Option<NodeId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Else {
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct While {
    pub condition: NodeId,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DoWhile {
    pub body: Block,
    pub condition: NodeId,
    /// Line breaks before the `while` keyword.
    pub while_newlines: u8,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Compound {
    pub keyword: CompoundKeyword,
    /// Header, parentheses included (`(var x in xs)`).
    pub header: Option<TokenRun>,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Switch {
    pub value: NodeId,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Case {
    /// `None` for `default:`.
    pub value: Option<TokenRun>,
    pub body: Block,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Return {
    pub value: Option<NodeId>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Goto {
    pub target: TokenRun,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Label {
    pub name: Box<str>,
}

/// Node payload.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum NodeKind {
    /// Left behind by [`Tree::dispose`](crate::Tree::dispose).
    Disposed,
    Annotation(Annotation),
    /// Source the grammar could not place, kept verbatim.
    Unrecognized(TokenRun),
    Expression(TokenRun),
    CompilationUnit(Block),
    Using(UsingDirective),
    Namespace(Namespace),
    TypeDecl(TypeDecl),
    EnumDecl(EnumDecl),
    Method(Method),
    Property(Property),
    Variable(Variable),
    If(If),
    Else(Else),
    While(While),
    DoWhile(DoWhile),
    Compound(Compound),
    Switch(Switch),
    Case(Case),
    Return(Return),
    Break,
    Continue,
    Goto(Goto),
    Label(Label),
    BlockStmt(Block),
    /// A lone `;`.
    Empty,
}

impl NodeKind {
    pub fn category(&self) -> Category {
        match self {
            NodeKind::Disposed => Category::Disposed,
            NodeKind::Annotation(_) => Category::Annotation,
            NodeKind::Unrecognized(_) => Category::Unrecognized,
            NodeKind::Expression(_) => Category::Expression,
            NodeKind::CompilationUnit(_) => Category::Root,
            _ => Category::Statement,
        }
    }

    #[inline]
    pub fn is_statement(&self) -> bool {
        self.category() == Category::Statement
    }

    #[inline]
    pub fn is_annotation(&self) -> bool {
        matches!(self, NodeKind::Annotation(_))
    }

    #[inline]
    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            NodeKind::Annotation(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn annotation_mut(&mut self) -> Option<&mut Annotation> {
        match self {
            NodeKind::Annotation(a) => Some(a),
            _ => None,
        }
    }

    /// Declarations: named members that carry modifiers.
    pub fn is_declaration(&self) -> bool {
        self.modifiers().is_some()
    }

    /// Name registered in the enclosing block's dictionary. A dotted
    /// namespace registers its first segment.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::Namespace(d) => d
                .name
                .tokens
                .iter()
                .find(|t| t.kind == RunTokenKind::Code)
                .map(|t| &*t.text),
            NodeKind::TypeDecl(d) => Some(&d.name),
            NodeKind::EnumDecl(d) => Some(&d.name),
            NodeKind::Method(d) => Some(&d.name),
            NodeKind::Property(d) => Some(&d.name),
            NodeKind::Variable(d) => Some(&d.name),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Option<&Modifiers> {
        match self {
            NodeKind::TypeDecl(d) => Some(&d.modifiers),
            NodeKind::EnumDecl(d) => Some(&d.modifiers),
            NodeKind::Method(d) => Some(&d.modifiers),
            NodeKind::Property(d) => Some(&d.modifiers),
            NodeKind::Variable(d) => Some(&d.modifiers),
            _ => None,
        }
    }

    pub fn modifiers_mut(&mut self) -> Option<&mut Modifiers> {
        match self {
            NodeKind::TypeDecl(d) => Some(&mut d.modifiers),
            NodeKind::EnumDecl(d) => Some(&mut d.modifiers),
            NodeKind::Method(d) => Some(&mut d.modifiers),
            NodeKind::Property(d) => Some(&mut d.modifiers),
            NodeKind::Variable(d) => Some(&mut d.modifiers),
            _ => None,
        }
    }

    /// The node's statement block, if it has one.
    pub fn block(&self) -> Option<&Block> {
        match self {
            NodeKind::CompilationUnit(b) | NodeKind::BlockStmt(b) => Some(b),
            NodeKind::Namespace(d) => Some(&d.body),
            NodeKind::TypeDecl(d) => Some(&d.body),
            NodeKind::Method(d) => d.body.as_ref(),
            NodeKind::If(s) => Some(&s.body),
            NodeKind::Else(s) => Some(&s.body),
            NodeKind::While(s) => Some(&s.body),
            NodeKind::DoWhile(s) => Some(&s.body),
            NodeKind::Compound(s) => Some(&s.body),
            NodeKind::Switch(s) => Some(&s.body),
            NodeKind::Case(s) => Some(&s.body),
            _ => None,
        }
    }

    pub fn block_mut(&mut self) -> Option<&mut Block> {
        match self {
            NodeKind::CompilationUnit(b) | NodeKind::BlockStmt(b) => Some(b),
            NodeKind::Namespace(d) => Some(&mut d.body),
            NodeKind::TypeDecl(d) => Some(&mut d.body),
            NodeKind::Method(d) => d.body.as_mut(),
            NodeKind::If(s) => Some(&mut s.body),
            NodeKind::Else(s) => Some(&mut s.body),
            NodeKind::While(s) => Some(&mut s.body),
            NodeKind::DoWhile(s) => Some(&mut s.body),
            NodeKind::Compound(s) => Some(&mut s.body),
            NodeKind::Switch(s) => Some(&mut s.body),
            NodeKind::Case(s) => Some(&mut s.body),
            _ => None,
        }
    }

    /// Brace handling for this node's block.
    pub fn brace_policy(&self) -> BracePolicy {
        match self {
            NodeKind::CompilationUnit(_) => BracePolicy::Never,
            NodeKind::Case(_) => BracePolicy::Implicit,
            NodeKind::If(_) | NodeKind::Else(_) | NodeKind::While(_) | NodeKind::DoWhile(_) => {
                BracePolicy::Optional
            }
            NodeKind::Compound(s) => s.keyword.brace_policy(),
            _ => BracePolicy::Required,
        }
    }

    /// Child nodes other than block children and annotations
    /// (conditions, initializers, else clauses).
    pub fn operands(&self) -> impl Iterator<Item = NodeId> {
        let (a, b) = match self {
            NodeKind::Variable(d) => (d.init, None),
            NodeKind::If(s) => (Some(s.condition), s.else_clause),
            NodeKind::While(s) => (Some(s.condition), None),
            NodeKind::DoWhile(s) => (Some(s.condition), None),
            NodeKind::Switch(s) => (Some(s.value), None),
            NodeKind::Return(s) => (s.value, None),
            _ => (None, None),
        };
        a.into_iter().chain(b).filter(|id| id.is_some())
    }

    /// Rewrite every child id (block children, block annotations, operands).
    pub(crate) fn map_children(&mut self, f: &mut dyn FnMut(NodeId) -> NodeId) {
        match self {
            NodeKind::Variable(d) => d.init = d.init.map(&mut *f),
            NodeKind::If(s) => {
                s.condition = f(s.condition);
                s.else_clause = s.else_clause.map(&mut *f);
            }
            NodeKind::While(s) => s.condition = f(s.condition),
            NodeKind::DoWhile(s) => s.condition = f(s.condition),
            NodeKind::Switch(s) => s.value = f(s.value),
            NodeKind::Return(s) => s.value = s.value.map(&mut *f),
            _ => {}
        }
        if let Some(block) = self.block_mut() {
            block.map_children(f);
        }
    }

    /// Default newline count before a node of this kind.
    pub fn default_newlines(&self) -> u32 {
        match self {
            NodeKind::Expression(_) | NodeKind::CompilationUnit(_) | NodeKind::Disposed => 0,
            NodeKind::Annotation(a) => u32::from(a.ends_line()),
            _ => 1,
        }
    }

    /// Kinds that may end with a `;`.
    pub fn allows_terminator(&self) -> bool {
        match self {
            NodeKind::Expression(_)
            | NodeKind::Unrecognized(_)
            | NodeKind::Using(_)
            | NodeKind::Variable(_)
            | NodeKind::Property(_)
            | NodeKind::DoWhile(_)
            | NodeKind::Return(_)
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Goto(_) => true,
            NodeKind::Method(m) => m.body.is_none(),
            NodeKind::EnumDecl(_) => true,
            _ => false,
        }
    }

    /// Kinds whose `;` is mandatory.
    pub fn default_terminator(&self) -> bool {
        match self {
            NodeKind::Using(_)
            | NodeKind::Variable(_)
            | NodeKind::DoWhile(_)
            | NodeKind::Return(_)
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Goto(_) => true,
            NodeKind::Method(m) => m.body.is_none(),
            _ => false,
        }
    }
}

/// A tree node.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) parent: NodeId,
    pub(crate) annotations: Vec<NodeId>,
    pub(crate) format: FormatState,
    pub(crate) pos: Position,
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, format: FormatState, pos: Position) -> Self {
        Node {
            parent: NodeId::NONE,
            annotations: Vec::new(),
            format,
            pos,
            kind,
        }
    }

    #[inline]
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Attached annotations in render order within each position group.
    #[inline]
    pub fn annotations(&self) -> &[NodeId] {
        &self.annotations
    }

    #[inline]
    pub fn format(&self) -> FormatState {
        self.format
    }

    #[inline]
    pub fn newlines(&self) -> u8 {
        self.format.newlines()
    }

    /// Source position, or the position stamped by the last
    /// position-updating render.
    #[inline]
    pub fn pos(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.kind.category()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_text_joins_lines_with_spaces() {
        let mut run = TokenRun::new();
        run.push(RunToken::code("Foo", false));
        run.push(RunToken::code("(", false));
        let mut arg = RunToken::code("x", false);
        arg.newlines = 1;
        run.push(arg);
        run.push(RunToken::code(")", false));
        assert_eq!(run.text(), "Foo( x)");
        assert!(run.is_multiline());
    }

    #[test]
    fn categories() {
        assert_eq!(NodeKind::Break.category(), Category::Statement);
        assert_eq!(
            NodeKind::Expression(TokenRun::from_text("x")).category(),
            Category::Expression
        );
        assert_eq!(NodeKind::Disposed.category(), Category::Disposed);
    }

    #[test]
    fn terminator_rules() {
        let abstract_method = NodeKind::Method(Method {
            modifiers: Modifiers::new(),
            return_type: Some(TokenRun::from_text("void")),
            name: "Run".into(),
            type_params: None,
            params: TokenRun::new(),
            trailer: None,
            body: None,
        });
        assert!(abstract_method.allows_terminator());
        assert!(abstract_method.default_terminator());
        assert!(!NodeKind::Expression(TokenRun::from_text("x")).default_terminator());
        assert!(!NodeKind::Empty.allows_terminator());
    }
}
