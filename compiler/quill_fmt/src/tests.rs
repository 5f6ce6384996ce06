#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;
use quill_ir::{NodeKind, Tree};
use quill_parse::{parse, ParseConfig};

fn parse_plain(source: &str) -> Tree {
    let output = parse(source, &ParseConfig::default());
    assert_eq!(output.fatal, None);
    output.tree
}

fn round_trip(source: &str) {
    let tree = parse_plain(source);
    assert_eq!(render(&tree, &RenderConfig::default()), source);
}

#[test]
fn renders_a_class_unchanged() {
    round_trip("using System;\n\nnamespace Demo\n{\n    public static class Program\n    {\n        static void Main(string[] args)\n        {\n            Console.WriteLine(args.Length);\n        }\n    }\n}\n");
}

#[test]
fn empty_source_renders_empty() {
    round_trip("");
}

#[test]
fn missing_final_newline_is_kept() {
    round_trip("class A\n{\n}");
}

#[test]
fn trailing_newline_option() {
    let tree = parse_plain("class A\n{\n}");
    let config = RenderConfig::default().with_trailing_newline(true);
    assert_eq!(render(&tree, &config), "class A\n{\n}\n");
}

#[test]
fn crlf_source_renders_crlf() {
    round_trip("class A\r\n{\r\n    int x;\r\n}\r\n");
}

#[test]
fn newline_mode_overrides_source() {
    let tree = parse_plain("class A\r\n{\r\n}\r\n");
    let config = RenderConfig::default().with_newline(NewlineMode::Lf);
    assert_eq!(render(&tree, &config), "class A\n{\n}\n");
}

#[test]
fn indentation_is_regenerated() {
    let tree = parse_plain("class A\n{\n  int x;\n}\n");
    assert_eq!(render(&tree, &RenderConfig::default()), "class A\n{\n    int x;\n}\n");
    let tabs = RenderConfig::default().with_tabs(true);
    assert_eq!(render(&tree, &tabs), "class A\n{\n\tint x;\n}\n");
}

#[test]
fn positions_follow_rendered_output() {
    let mut tree = parse_plain("class A\n{\n  int x;\n}\n");
    let output = render_tree_mut(&mut tree, &RenderConfig::default());
    assert_eq!(output, "class A\n{\n    int x;\n}\n");
    let class = tree.children(tree.root())[0];
    let field = tree.children(class)[0];
    assert_eq!(tree.get(class).pos(), Position::new(1, 1));
    assert_eq!(tree.get(field).pos(), Position::new(3, 5));
}

#[test]
fn render_node_without_positions_returns_none() {
    let tree = parse_plain("class A\n{\n}\n");
    let mut writer = StringWriter::lf();
    let positions = render_node(&tree, tree.root(), &mut writer, RenderFlags::empty());
    assert!(positions.is_empty());
    assert_eq!(writer.output(), "class A\n{\n}\n");
}

#[test]
fn describe_summarizes_bodies() {
    let tree = parse_plain(
        "// leading\nclass A\n{\n    void F(int a) // note\n    {\n        return;\n    }\n}\n",
    );
    let class = tree.children(tree.root())[0];
    assert_eq!(describe(&tree, class), "class A { ... }");
    let method = tree.children(class)[0];
    assert!(matches!(tree.kind(method), NodeKind::Method(_)));
    assert_eq!(describe(&tree, method), "void F(int a) { ... }");
}

#[test]
fn describe_control_flow() {
    let tree = parse_plain("class A\n{\n    void F()\n    {\n        if (x)\n            Run();\n        else\n        {\n        }\n    }\n}\n");
    let class = tree.children(tree.root())[0];
    let method = tree.children(class)[0];
    let stmt = tree.children(method)[0];
    assert_eq!(describe(&tree, stmt), "if (x) ... else { }");
}
