//! Quill IR - syntax tree types for the format-preserving engine.
//!
//! This crate contains the data structures shared by the lexer, parser and
//! renderer:
//! - Cooked tokens and token sets
//! - The node arena ([`Tree`]) with parent links, annotations and blocks
//! - Per-node formatting state (newline counts and style flags)
//! - Declaration modifiers and per-block name dictionaries
//!
//! # Design Philosophy
//!
//! - **Flat arena**: nodes refer to each other by [`NodeId`], never by
//!   ownership, so reparenting and cloning are index rewrites.
//! - **Layout is data**: every newline count, brace and comment position
//!   needed to reproduce the source lives on the nodes themselves.
//! - **Opaque where possible**: parts of the source the engine does not
//!   interpret are kept as [`TokenRun`]s and rendered as written.

mod annotation;
mod block;
mod collection;
mod dictionary;
mod edit;
mod format;
mod modifiers;
mod node;
mod node_id;
mod span;
mod token;
mod tree;

pub use annotation::{
    Annotation, AnnotationFlags, AnnotationKind, AnnotationPosition, CommentStyle, Directive,
    DirectiveKind, Message, Severity,
};
pub use block::{Block, BracePolicy, MAX_END_NEWLINES};
pub use collection::ChildList;
pub use dictionary::{AmbiguityGroup, ExternalSymbol, Lookup, NameDictionary, Symbol, GOTO_PREFIX};
pub use edit::BlockEditor;
pub use format::{FormatFlags, FormatState, MAX_NEWLINES};
pub use modifiers::{split_leading_modifiers, Modifier, ModifierFlags, ModifierToken, Modifiers};
pub use node::{
    Case, Category, Compound, CompoundKeyword, DoWhile, Else, EnumDecl, Goto, If, Label, Method,
    Namespace, Node, NodeKind, Property, Return, RunToken, RunTokenKind, Switch, TokenRun,
    TypeDecl, TypeKeyword, UsingDirective, Variable, While,
};
pub use node_id::NodeId;
pub use span::{Position, Span};
pub use token::{Token, TokenKind, TokenList, TokenSet, TrailingComment};
pub use tree::{Diagnostic, DiagnosticCounts, Tree, TreeSettings};
