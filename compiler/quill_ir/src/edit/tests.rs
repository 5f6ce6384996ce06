#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    Block, Else, If, Lookup, Method, Modifiers, Namespace, Position, Symbol, TokenRun,
    TreeSettings,
};

fn if_stmt(tree: &mut Tree, body: Block, else_clause: Option<NodeId>) -> NodeId {
    let condition = tree.alloc(NodeKind::Expression(TokenRun::from_text("ready")));
    tree.alloc(NodeKind::If(If {
        condition,
        body,
        else_clause,
    }))
}

fn method(tree: &mut Tree, name: &str) -> NodeId {
    tree.alloc(NodeKind::Method(Method {
        modifiers: Modifiers::new(),
        return_type: Some(TokenRun::from_text("void")),
        name: name.into(),
        type_params: None,
        params: TokenRun::new(),
        trailer: None,
        body: Some(Block::braced(NodeId::NONE)),
    }))
}

#[test]
fn second_statement_adds_braces() {
    let mut tree = Tree::new();
    let stmt = if_stmt(&mut tree, Block::unbraced(NodeId::NONE), None);
    let first = tree.alloc(NodeKind::Break);
    let second = tree.alloc(NodeKind::Continue);

    let mut editor = tree.edit_block(stmt).unwrap();
    editor.add(first);
    assert!(!editor.tree().block(stmt).unwrap().has_braces());
    editor.add(second);
    assert!(tree.block(stmt).unwrap().has_braces());
    assert_eq!(tree.children(stmt), &[first, second]);
}

#[test]
fn removing_braces_from_multi_statement_block_is_refused() {
    let mut tree = Tree::new();
    let stmt = if_stmt(&mut tree, Block::braced(NodeId::NONE), None);
    let a = tree.alloc(NodeKind::Break);
    let b = tree.alloc(NodeKind::Continue);
    let mut editor = tree.edit_block(stmt).unwrap();
    editor.add_range([a, b]);
    assert!(!editor.set_has_braces(false));
    assert!(tree.block(stmt).unwrap().has_braces());
}

#[test]
fn cleanup_strips_single_statement_braces_and_moves_else() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let else_clause = tree.alloc_parsed(
        NodeKind::Else(Else {
            body: Block::braced(NodeId::NONE),
        }),
        0,
        Position::START,
    );
    let stmt = if_stmt(&mut tree, Block::braced(NodeId::NONE), Some(else_clause));
    let only = tree.alloc(NodeKind::Break);

    tree.edit_block(stmt).unwrap().add(only);

    let block = tree.block(stmt).unwrap();
    assert!(!block.has_braces());
    assert_eq!(block.end_newlines(), 0);
    assert_eq!(tree.get(else_clause).newlines(), 1);
}

#[test]
fn explicit_braces_survive_cleanup() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let stmt = if_stmt(&mut tree, Block::braced(NodeId::NONE), None);
    let only = tree.alloc(NodeKind::Break);
    let mut editor = tree.edit_block(stmt).unwrap();
    assert!(editor.set_has_braces(true));
    editor.add(only);
    assert!(tree.block(stmt).unwrap().has_braces());
}

#[test]
fn generated_trees_keep_braces() {
    let mut tree = Tree::new();
    let stmt = if_stmt(&mut tree, Block::braced(NodeId::NONE), None);
    let only = tree.alloc(NodeKind::Break);
    tree.edit_block(stmt).unwrap().add(only);
    assert!(tree.block(stmt).unwrap().has_braces());
}

#[test]
fn nested_if_keeps_braces_when_outer_has_else() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let else_clause = tree.alloc(NodeKind::Else(Else {
        body: Block::braced(NodeId::NONE),
    }));
    let outer = if_stmt(&mut tree, Block::braced(NodeId::NONE), Some(else_clause));
    let inner = if_stmt(&mut tree, Block::braced(NodeId::NONE), None);
    tree.edit_block(outer).unwrap().add(inner);
    assert!(tree.block(outer).unwrap().has_braces());
}

#[test]
fn end_newlines_are_clamped() {
    let mut tree = Tree::new();
    let ns = tree.alloc(NodeKind::Namespace(Namespace {
        name: TokenRun::from_text("App"),
        body: Block::braced(NodeId::NONE),
    }));
    tree.block_mut(ns).unwrap().format_mut().set_end_newlines(5);
    let m = method(&mut tree, "Run");
    tree.edit_block(ns).unwrap().add(m);
    assert_eq!(tree.block(ns).unwrap().end_newlines(), MAX_END_NEWLINES);
}

#[test]
fn namespaces_are_named_in_their_block() {
    let mut tree = Tree::new();
    let root = tree.root();
    let ns = tree.alloc(NodeKind::Namespace(Namespace {
        name: TokenRun::from_text("App"),
        body: Block::braced(NodeId::NONE),
    }));
    let m = method(&mut tree, "Run");
    tree.edit_block(root).unwrap().add(ns);
    tree.edit_block(ns).unwrap().add(m);
    assert_eq!(tree.lookup(m, "App"), Lookup::Single(Symbol::Node(ns)));
    assert_eq!(tree.lookup(m, "Run"), Lookup::Single(Symbol::Node(m)));
}

#[test]
fn adding_an_existing_child_again_adds_a_copy() {
    let mut tree = Tree::new();
    let root = tree.root();
    let m = method(&mut tree, "Run");
    tree.edit_block(root).unwrap().add(m);
    let copy = tree.edit_block(root).unwrap().add(m);
    assert_ne!(copy, m);
    assert_eq!(tree.children(root), &[m, copy]);
    match tree.lookup(root, "Run") {
        Lookup::Group(group) => assert_eq!(group.len(), 2),
        other => panic!("expected group, got {other:?}"),
    }
}

#[test]
fn dictionary_follows_edits() {
    let mut tree = Tree::new();
    let root = tree.root();
    let run = method(&mut tree, "Run");
    let stop = method(&mut tree, "Stop");

    let mut editor = tree.edit_block(root).unwrap();
    editor.add(run);
    assert_eq!(
        editor.tree().lookup(root, "Run"),
        Lookup::Single(Symbol::Node(run))
    );

    let stored = editor.replace(run, stop).unwrap();
    assert_eq!(stored, stop);
    assert!(editor.tree().lookup(root, "Run").is_none());
    assert_eq!(
        editor.tree().lookup(root, "Stop"),
        Lookup::Single(Symbol::Node(stop))
    );

    assert!(editor.remove(stop));
    assert!(editor.is_empty());
    assert!(tree.lookup(root, "Stop").is_none());
}

#[test]
fn overloads_form_a_group() {
    let mut tree = Tree::new();
    let root = tree.root();
    let a = method(&mut tree, "Run");
    let b = method(&mut tree, "Run");
    tree.edit_block(root).unwrap().add_range([a, b]);
    match tree.lookup(root, "Run") {
        Lookup::Group(group) => assert_eq!(group.len(), 2),
        other => panic!("expected group, got {other:?}"),
    }
    tree.edit_block(root).unwrap().remove_at(0);
    assert_eq!(tree.lookup(root, "Run"), Lookup::Single(Symbol::Node(b)));
}

#[test]
fn expressions_added_to_blocks_become_statements() {
    let mut tree = Tree::new();
    let root = tree.root();
    let call = tree.alloc(NodeKind::Expression(TokenRun::from_text("Run()")));
    assert!(!tree.has_terminator(call));
    tree.edit_block(root).unwrap().add(call);
    assert!(tree.has_terminator(call));
}

#[test]
fn clear_empties_block_and_dictionary() {
    let mut tree = Tree::new();
    let root = tree.root();
    let a = method(&mut tree, "Run");
    tree.edit_block(root).unwrap().add(a);
    tree.edit_block(root).unwrap().clear();
    assert!(tree.children(root).is_empty());
    assert!(tree.block(root).unwrap().dictionary().is_empty());
    assert!(tree.parent(a).is_none());
}
