#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use quill_ir::{Tree, TreeSettings};

use super::*;
use crate::{parse, ParseConfig};

fn parse_plain(source: &str) -> Tree {
    parse(source, &ParseConfig::default()).tree
}

fn top(tree: &Tree) -> Vec<NodeId> {
    tree.children(tree.root()).to_vec()
}

#[test]
fn comment_between_statements_leads_the_next() {
    let tree = parse_plain("a();\n// about b\nb();\n");
    let items = top(&tree);
    assert_eq!(items.len(), 2);
    assert_eq!(
        tree.annotations_at(items[1], AnnotationPosition::Prefix).len(),
        1
    );
}

#[test]
fn comment_at_block_end_stays_a_child() {
    let tree = parse_plain("a();\n// done\n");
    let items = top(&tree);
    assert_eq!(items.len(), 2);
    assert!(tree.kind(items[1]).is_annotation());
}

#[test]
fn run_of_comments_moves_together() {
    let tree = parse_plain("// one\n// two\nint x;\n");
    let items = top(&tree);
    assert_eq!(items.len(), 1);
    assert_eq!(
        tree.annotations_at(items[0], AnnotationPosition::Prefix).len(),
        2
    );
    // The statement keeps the newlines before the first comment.
    assert_eq!(tree.get(items[0]).newlines(), 0);
}

#[test]
fn comment_on_the_statement_line_is_end_of_line() {
    let tree = parse_plain("a(); // why\n");
    let items = top(&tree);
    assert_eq!(items.len(), 1);
    assert_eq!(tree.annotations_at(items[0], AnnotationPosition::Eol).len(), 1);
}

#[test]
fn comment_after_open_brace_belongs_to_the_block() {
    let tree = parse_plain("class A\n{ // members\n}\n");
    let class = top(&tree)[0];
    assert_eq!(tree.block(class).unwrap().annotations().len(), 1);
    assert!(tree.children(class).is_empty());
}

#[test]
fn braceless_body_takes_leading_comments() {
    let tree = parse_plain("if (a)\n    // only when a\n    b();\n");
    let body = tree.children(top(&tree)[0]).to_vec();
    assert_eq!(body.len(), 1);
    assert_eq!(
        tree.annotations_at(body[0], AnnotationPosition::Prefix).len(),
        1
    );
    assert_eq!(tree.block(top(&tree)[0]).unwrap().newlines(), 1);
}

#[test]
fn tight_braces_are_recorded() {
    let tree = parse_plain("class A\n{}\n");
    let block = tree.block(top(&tree)[0]).unwrap();
    assert!(block.has_braces());
    assert_eq!(block.end_newlines(), 0);
    assert!(block.format().contains(FormatFlags::TIGHT));
}

#[test]
fn blank_lines_before_close_are_clamped() {
    let tree = parse_plain("class A\n{\n    int x;\n\n\n\n}\n");
    let block = tree.block(top(&tree)[0]).unwrap();
    assert_eq!(block.end_newlines(), 2);
}

#[test]
fn root_keeps_trailing_newlines() {
    let tree = parse_plain("a();\n\n");
    assert_eq!(tree.block(tree.root()).unwrap().end_newlines(), 2);
}

#[test]
fn stray_close_brace_at_top_level_is_unrecognized() {
    let tree = parse_plain("}\n");
    let items = top(&tree);
    assert_eq!(items.len(), 1);
    assert!(matches!(tree.kind(items[0]), NodeKind::Unrecognized(_)));
}

#[test]
fn free_standing_conditional_directives_stay_children() {
    let tree = parse_plain("#if A\nint x;\n#endif\n");
    let items = top(&tree);
    // `#if` leads nothing; the inactive branch lives in its skipped text.
    assert!(items.iter().all(|&id| tree.kind(id).is_annotation()));
    assert_eq!(items.len(), 2);
}

#[test]
fn empty_tree_for_empty_source() {
    let tree = parse_plain("");
    assert!(top(&tree).is_empty());
    let fresh = Tree::for_source(TreeSettings::default());
    assert_eq!(tree.len(), fresh.len());
}
