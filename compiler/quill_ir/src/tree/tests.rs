#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    CommentStyle, If, Label, Method, Modifiers, TokenRun, TrailingComment, TreeSettings, Variable,
};

fn comment(tree: &mut Tree, text: &str, newlines: u32) -> NodeId {
    tree.alloc_annotation(Annotation::line_comment(text), newlines, Position::START)
}

fn stmt(tree: &mut Tree, newlines: u32) -> NodeId {
    tree.alloc_parsed(NodeKind::Break, newlines, Position::START)
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

fn variable(tree: &mut Tree, name: &str) -> NodeId {
    tree.alloc(NodeKind::Variable(Variable {
        modifiers: Modifiers::new(),
        ty: TokenRun::from_text("int"),
        name: name.into(),
        trailer: None,
        init: None,
    }))
}

// === Annotation attachment ===

#[test]
fn prepending_swaps_differing_newlines() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let host = stmt(&mut tree, 1);
    let ann = comment(&mut tree, "// c", 0);
    tree.attach_annotation(host, ann, AnnotationPosition::Prefix, true);
    assert_eq!(tree.get(host).newlines(), 0);
    assert_eq!(tree.get(ann).newlines(), 1);
    assert_eq!(tree.get(host).annotations(), &[ann]);
    assert_eq!(tree.parent(ann), host);
}

#[test]
fn larger_annotation_count_moves_to_host() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let host = stmt(&mut tree, 1);
    let ann = comment(&mut tree, "// c", 2);
    tree.attach_annotation(host, ann, AnnotationPosition::Prefix, false);
    assert_eq!(tree.get(host).newlines(), 2);
    assert_eq!(tree.get(ann).newlines(), 1);
}

#[test]
fn equal_counts_are_left_alone() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let host = stmt(&mut tree, 1);
    let first = comment(&mut tree, "// a", 1);
    let second = comment(&mut tree, "// b", 0);
    tree.attach_annotation(host, first, AnnotationPosition::Prefix, true);
    assert_eq!(tree.get(host).newlines(), 1);

    // Walking backwards: the earlier comment is prepended last.
    tree.attach_annotation(host, second, AnnotationPosition::Prefix, true);
    assert_eq!(tree.get(host).annotations(), &[second, first]);
    assert_eq!(tree.get(host).newlines(), 0);
    assert_eq!(tree.get(second).newlines(), 1);
    assert_eq!(tree.get(first).newlines(), 1);
}

#[test]
fn appending_smaller_count_does_not_swap() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let host = stmt(&mut tree, 1);
    let ann = comment(&mut tree, "// c", 0);
    tree.attach_annotation(host, ann, AnnotationPosition::Prefix, false);
    assert_eq!(tree.get(host).newlines(), 1);
    assert_eq!(tree.get(ann).newlines(), 0);
}

#[test]
fn eol_comments_and_messages_never_swap() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let host = stmt(&mut tree, 0);
    let eol = comment(&mut tree, "// c", 3);
    tree.attach_annotation(host, eol, AnnotationPosition::Eol, true);
    assert_eq!(tree.get(host).newlines(), 0);
    assert_eq!(tree.annotation(eol).unwrap().position(), AnnotationPosition::Eol);

    let msg = tree.attach_message(host, Severity::Warning, "odd");
    assert_eq!(tree.get(host).newlines(), 0);
    assert_eq!(tree.get(msg).newlines(), 0);
}

#[test]
fn first_on_line_annotation_promotes_default_host() {
    let mut tree = Tree::new();
    let host = tree.alloc(NodeKind::Break);
    tree.format_mut(host).set_default_newlines(0);

    let mut annotation = Annotation::line_comment("// c");
    annotation.flags.insert(AnnotationFlags::IS_FIRST_ON_LINE);
    let ann = tree.alloc_annotation(annotation, 1, Position::START);
    tree.attach_annotation(host, ann, AnnotationPosition::Prefix, true);
    assert_eq!(tree.get(host).newlines(), 1);
    assert_eq!(tree.get(ann).newlines(), 1);
}

#[test]
fn move_eol_comment_leaves_inline_comments() {
    let mut tree = Tree::for_source(TreeSettings::default());
    let host = stmt(&mut tree, 1);
    let mut token = Token::new(crate::TokenKind::Semicolon, ";");
    token.trailing.push(TrailingComment {
        text: "/* inline */".into(),
        style: CommentStyle::Block,
        is_eol: false,
        space_before: true,
    });
    token.trailing.push(TrailingComment {
        text: "// done".into(),
        style: CommentStyle::Line,
        is_eol: true,
        space_before: true,
    });

    let eol = tree.move_eol_comment(host, &mut token, false).unwrap();
    assert_eq!(token.trailing.len(), 1);
    assert!(!token.trailing[0].is_eol);
    assert_eq!(tree.get(host).annotations(), &[eol]);
    assert!(tree
        .annotation(eol)
        .unwrap()
        .flags
        .contains(AnnotationFlags::IS_EOL));

    assert_eq!(tree.move_eol_comment(host, &mut token, true), None);
    assert!(token.trailing.is_empty());
    assert_eq!(tree.get(host).annotations().len(), 2);
}

#[test]
fn diagnostics_are_counted_by_severity() {
    let mut tree = Tree::new();
    let root = tree.root();
    let a = stmt(&mut tree, 1);
    tree.edit_block(root).unwrap().add(a);
    tree.attach_message(a, Severity::Error, "bad");
    tree.attach_message(a, Severity::Information, "fyi");
    tree.attach_message(root, Severity::Warning, "hmm");

    let counts = tree.diagnostic_counts();
    assert_eq!(
        counts,
        DiagnosticCounts {
            errors: 1,
            warnings: 1,
            infos: 1
        }
    );
    let texts: Vec<&str> = tree.diagnostics().iter().map(|d| d.text).collect();
    assert_eq!(texts, vec!["hmm", "bad", "fyi"]);
}

// === Formatting ===

#[test]
fn default_format_is_idempotent() {
    let mut tree = Tree::new();
    let v = variable(&mut tree, "x");
    let before = tree.format(v);
    tree.default_format(v);
    tree.default_format(v);
    assert_eq!(tree.format(v), before);
    assert!(tree.has_terminator(v));
    assert_eq!(tree.get(v).newlines(), 1);
}

#[test]
fn set_parent_keeps_explicit_newlines() {
    let mut tree = Tree::new();
    let v = variable(&mut tree, "x");
    tree.set_newlines(v, 3);
    tree.set_parent(v, tree.root());
    assert_eq!(tree.get(v).newlines(), 3);
}

#[test]
fn terminator_ignored_where_not_allowed() {
    let mut tree = Tree::new();
    let m = method(&mut tree, "Run");
    tree.set_terminator(m, true);
    assert!(!tree.has_terminator(m));
}

// === Cloning and disposal ===

#[test]
fn deep_clone_copies_subtree_and_relinks() {
    let mut tree = Tree::new();
    let m = method(&mut tree, "Run");
    let v = variable(&mut tree, "x");
    tree.edit_block(m).unwrap().add(v);
    let ann = comment(&mut tree, "// doc", 1);
    tree.attach_annotation(m, ann, AnnotationPosition::Prefix, true);

    let copy = tree.deep_clone(m);
    assert_ne!(copy, m);
    assert!(tree.parent(copy).is_none());

    let copied_children = tree.children(copy).to_vec();
    assert_eq!(copied_children.len(), 1);
    assert_ne!(copied_children[0], v);
    assert_eq!(tree.parent(copied_children[0]), copy);
    assert_eq!(tree.block(copy).unwrap().owner(), copy);

    let copied_ann = tree.get(copy).annotations()[0];
    assert_ne!(copied_ann, ann);
    assert_eq!(tree.parent(copied_ann), copy);

    assert_eq!(
        tree.block(copy).unwrap().dictionary().find("x"),
        Lookup::Single(Symbol::Node(copied_children[0]))
    );
}

#[test]
fn dispose_unlinks_and_nulls_parents() {
    let mut tree = Tree::new();
    let root = tree.root();
    let m = method(&mut tree, "Run");
    let v = variable(&mut tree, "x");
    tree.edit_block(root).unwrap().add(m);
    tree.edit_block(m).unwrap().add(v);

    tree.dispose(m);
    assert!(tree.children(root).is_empty());
    assert!(!tree.is_live(m));
    assert!(!tree.is_live(v));
    assert!(tree.parent(v).is_none());
    assert!(tree.lookup(root, "Run").is_none());
}

// === Names ===

#[test]
fn lookup_walks_outward() {
    let mut tree = Tree::new();
    let root = tree.root();
    let m = method(&mut tree, "Run");
    tree.edit_block(root).unwrap().add(m);
    let v = variable(&mut tree, "x");
    tree.edit_block(m).unwrap().add(v);

    assert_eq!(tree.lookup(v, "x"), Lookup::Single(Symbol::Node(v)));
    assert_eq!(tree.lookup(v, "Run"), Lookup::Single(Symbol::Node(m)));
    assert!(tree.lookup(v, "missing").is_none());
}

#[test]
fn goto_targets_resolve_within_method() {
    let mut tree = Tree::new();
    let root = tree.root();
    let m = method(&mut tree, "Run");
    tree.edit_block(root).unwrap().add(m);

    let label = tree.alloc(NodeKind::Label(Label { name: "done".into() }));
    let cond = tree.alloc(NodeKind::Expression(TokenRun::from_text("x")));
    let inner = tree.alloc(NodeKind::If(If {
        condition: cond,
        body: Block::braced(NodeId::NONE),
        else_clause: None,
    }));
    tree.edit_block(m).unwrap().add_range([inner, label]);
    let jump = tree.alloc(NodeKind::Break);
    tree.edit_block(inner).unwrap().add(jump);

    assert_eq!(
        tree.find_goto_target(jump, "done"),
        Some(Symbol::Node(label))
    );
    assert!(tree.lookup(jump, "done").is_none());
    assert_eq!(tree.find_goto_target(jump, "nowhere"), None);
}

#[test]
fn disposed_label_is_no_longer_a_goto_target() {
    let mut tree = Tree::new();
    let root = tree.root();
    let m = method(&mut tree, "Run");
    tree.edit_block(root).unwrap().add(m);
    let label = tree.alloc(NodeKind::Label(Label { name: "done".into() }));
    let ret = stmt(&mut tree, 1);
    tree.edit_block(m).unwrap().add_range([label, ret]);
    assert_eq!(tree.find_goto_target(ret, "done"), Some(Symbol::Node(label)));

    tree.dispose(label);
    assert!(!tree.is_live(label));
    assert_eq!(tree.find_goto_target(ret, "done"), None);
}
