#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use quill_ir::{NodeKind, Position, Severity, Tree, TreeSettings};

use super::*;
use crate::{parse, ParseConfig};

fn parser() -> Parser {
    let config = ParseConfig::default();
    let lexed = quill_lexer::lex("", &config.lex);
    Parser::new(lexed, TreeSettings::default(), &config)
}

fn directive_with_skipped(p: &mut Parser, skipped: &str) -> NodeId {
    let mut directive = Directive::new(DirectiveKind::If, "A");
    directive.skipped = Some(skipped.to_string());
    let annotation = Annotation::new(AnnotationKind::Directive(directive));
    p.tree.alloc_annotation(annotation, 0, Position::START)
}

fn skipped(p: &Parser, id: NodeId) -> Option<String> {
    p.tree.annotation(id)?.directive()?.skipped.clone()
}

fn first_declaration(tree: &Tree) -> NodeId {
    tree.children(tree.root())
        .iter()
        .copied()
        .find(|&id| tree.kind(id).is_declaration())
        .unwrap()
}

#[test]
fn inactive_branch_is_rewritten_in_canonical_order() {
    let mut p = parser();
    let id = directive_with_skipped(&mut p, "    static public int X;");
    p.rewrite_skipped(id, ModifierFlags::READONLY);
    assert_eq!(
        skipped(&p, id).as_deref(),
        Some("    public static readonly int X;")
    );
}

#[test]
fn branch_without_modifiers_is_left_alone() {
    let mut p = parser();
    let id = directive_with_skipped(&mut p, "int X;");
    p.rewrite_skipped(id, ModifierFlags::empty());
    assert_eq!(skipped(&p, id).as_deref(), Some("int X;"));
}

#[test]
fn modifiers_on_their_own_line_keep_the_line_break() {
    let mut p = parser();
    let id = directive_with_skipped(&mut p, "public\nint X;");
    p.rewrite_skipped(id, ModifierFlags::STATIC);
    assert_eq!(skipped(&p, id).as_deref(), Some("public static \nint X;"));
}

#[test]
fn modifiers_on_separate_lines_are_claimed() {
    let tree = parse("public\nstatic\nclass A\n{\n}\n", &ParseConfig::default()).tree;
    let decl = first_declaration(&tree);
    assert_eq!(tree.kind(decl).modifiers().unwrap().text(), "public static");
    assert_eq!(tree.children(tree.root()).len(), 1);
}

#[test]
fn blank_line_separates_a_modifier_from_the_declaration() {
    let tree = parse("public\n\nclass A\n{\n}\n", &ParseConfig::default()).tree;
    let items = tree.children(tree.root()).to_vec();
    assert_eq!(items.len(), 2);
    assert!(matches!(tree.kind(items[0]), NodeKind::Unrecognized(_)));
    assert!(tree.kind(items[1]).modifiers().unwrap().is_empty());
    let errors: Vec<_> = tree
        .diagnostics()
        .into_iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.text.to_string())
        .collect();
    assert_eq!(errors, vec!["unexpected `public`".to_string()]);
}

#[test]
fn two_conditional_chains_in_one_run() {
    let source = "#if A\nprivate\n#else\npublic\n#endif\n#if B\nsealed\n#else\nstatic\n#endif\nclass C\n{\n}\n";
    let tree = parse(source, &ParseConfig::default()).tree;
    let decl = first_declaration(&tree);
    let modifiers = tree.kind(decl).modifiers().unwrap();
    assert_eq!(modifiers.text(), "public static");
    assert!(modifiers.sandwiched);
    assert_eq!(tree.children(tree.root()).len(), 1);
}

#[test]
fn blank_line_after_a_conditional_chain_ends_the_sandwich() {
    let config = ParseConfig::default().with_define("A");
    let tree = parse("#if A\npublic\n#endif\n\nclass C\n{\n}\n", &config).tree;
    let decl = first_declaration(&tree);
    let modifiers = tree.kind(decl).modifiers().unwrap();
    assert!(!modifiers.sandwiched);
    assert!(modifiers.is_empty());
}

#[test]
fn comment_after_a_conditional_chain_ends_the_sandwich() {
    let config = ParseConfig::default().with_define("A");
    let tree = parse("#if A\npublic\n#endif\n// note\nclass C\n{\n}\n", &config).tree;
    let decl = first_declaration(&tree);
    assert!(!tree.kind(decl).modifiers().unwrap().sandwiched);
}

#[test]
fn touching_conditional_chain_is_sandwiched() {
    let config = ParseConfig::default().with_define("A");
    let tree = parse("#if A\npublic\n#endif\nclass C\n{\n}\n", &config).tree;
    let decl = first_declaration(&tree);
    let modifiers = tree.kind(decl).modifiers().unwrap();
    assert!(modifiers.sandwiched);
    assert_eq!(modifiers.text(), "public");
}
