#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use quill_ir::{
    Annotation, AnnotationPosition, Block, Method, Modifiers, NodeId, NodeKind, Position,
    Severity, TokenRun, Tree,
};
use quill_parse::{parse, ParseConfig};

use crate::{describe, render, RenderConfig};

fn parse_plain(source: &str) -> Tree {
    let output = parse(source, &ParseConfig::default());
    assert_eq!(output.fatal, None);
    output.tree
}

fn render_default(tree: &Tree) -> String {
    render(tree, &RenderConfig::default())
}

/// First statement of the first method of the first type.
fn first_statement(tree: &Tree) -> (NodeId, NodeId) {
    let class = tree.children(tree.root())[0];
    let method = tree.children(class)[0];
    (method, tree.children(method)[0])
}

fn method(tree: &mut Tree, name: &str) -> NodeId {
    tree.alloc(NodeKind::Method(Method {
        modifiers: Modifiers::new(),
        return_type: Some(TokenRun::from_text("void")),
        name: name.into(),
        type_params: None,
        params: TokenRun::from_text("()"),
        trailer: None,
        body: Some(Block::braced(NodeId::NONE)),
    }))
}

const METHOD: &str = "class A\n{\n    void F()\n    {\n        if (ok)\n            Run();\n    }\n}\n";

// === Generated trees ===

#[test]
fn generated_tree_starts_on_the_first_line() {
    let mut tree = Tree::new();
    let root = tree.root();
    let run = method(&mut tree, "Run");
    let stop = method(&mut tree, "Stop");
    tree.edit_block(root).unwrap().add_range([run, stop]);
    assert_eq!(render_default(&tree), "void Run()\n{\n}\nvoid Stop()\n{\n}");
}

#[test]
fn generated_statements_get_terminators() {
    let mut tree = Tree::new();
    let run = method(&mut tree, "Run");
    let call = tree.alloc(NodeKind::Expression(TokenRun::from_text("Go()")));
    tree.set_newlines(call, 1);
    tree.edit_block(run).unwrap().add(call);
    let root = tree.root();
    tree.edit_block(root).unwrap().add(run);
    assert_eq!(render_default(&tree), "void Run()\n{\n    Go();\n}");
}

// === Edits on parsed trees ===

#[test]
fn second_statement_brings_braces() {
    let mut tree = parse_plain(METHOD);
    let (_, stmt) = first_statement(&tree);
    let call = tree.alloc(NodeKind::Expression(TokenRun::from_text("Stop()")));
    tree.edit_block(stmt).unwrap().add(call);
    assert_eq!(
        render_default(&tree),
        "class A\n{\n    void F()\n    {\n        if (ok)\n        {\n            Run();\n            Stop();\n        }\n    }\n}\n"
    );
}

#[test]
fn single_line_block() {
    let mut tree = parse_plain("class A\n{\n    void F()\n    {\n        Run();\n    }\n}\n");
    let (method, _) = first_statement(&tree);
    tree.edit_block(method).unwrap().set_single_line(true);
    assert_eq!(render_default(&tree), "class A\n{\n    void F() { Run(); }\n}\n");
}

#[test]
fn added_prefix_comment_gets_its_own_line() {
    let mut tree = parse_plain("class A\n{\n    int x;\n}\n");
    let class = tree.children(tree.root())[0];
    let field = tree.children(class)[0];
    let comment = tree.alloc_annotation(Annotation::line_comment("// counter"), 1, Position::START);
    tree.attach_annotation(field, comment, AnnotationPosition::Prefix, false);
    assert_eq!(
        render_default(&tree),
        "class A\n{\n    // counter\n    int x;\n}\n"
    );
}

#[test]
fn added_eol_comment_follows_the_terminator() {
    let mut tree = parse_plain("class A\n{\n    int x;\n    int y;\n}\n");
    let class = tree.children(tree.root())[0];
    let field = tree.children(class)[0];
    let comment = tree.alloc_annotation(Annotation::line_comment("// first"), 0, Position::START);
    tree.attach_annotation(field, comment, AnnotationPosition::Eol, false);
    assert_eq!(
        render_default(&tree),
        "class A\n{\n    int x; // first\n    int y;\n}\n"
    );
}

#[test]
fn messages_are_not_rendered() {
    let mut tree = parse_plain(METHOD);
    let (_, stmt) = first_statement(&tree);
    tree.attach_message(stmt, Severity::Warning, "always true");
    assert_eq!(render_default(&tree), METHOD);
}

#[test]
fn disposed_nodes_disappear() {
    let mut tree = parse_plain("class A\n{\n    int x;\n    int y;\n}\n");
    let class = tree.children(tree.root())[0];
    let field = tree.children(class)[0];
    tree.dispose(field);
    assert_eq!(render_default(&tree), "class A\n{\n    int y;\n}\n");
}

#[test]
fn cloned_subtree_renders_like_the_original() {
    let mut tree = parse_plain(METHOD);
    let class = tree.children(tree.root())[0];
    let (method, _) = first_statement(&tree);
    let copy = tree.deep_clone(method);
    tree.edit_block(class).unwrap().add(copy);
    let output = render_default(&tree);
    let body = "    void F()\n    {\n        if (ok)\n            Run();\n    }\n";
    assert_eq!(output, format!("class A\n{{\n{body}{body}}}\n"));
}

// === Layout details ===

#[test]
fn tight_spacing_is_kept() {
    let source = "class A\n{\n    void F()\n    {\n        if(ok) {Run();}\n        a();b();\n    }\n}\n";
    let tree = parse_plain(source);
    assert_eq!(render_default(&tree), source);
}

#[test]
fn continuation_lines_keep_their_offset() {
    let source = "class A\n{\n    void F()\n    {\n        Call(first,\n             second);\n    }\n}\n";
    let tree = parse_plain(source);
    assert_eq!(render_default(&tree), source);
}

#[test]
fn continuation_lines_move_with_reindentation() {
    let tree = parse_plain("class A\n{\n  void F()\n  {\n    Call(first,\n         second);\n  }\n}\n");
    assert_eq!(
        render_default(&tree),
        "class A\n{\n    void F()\n    {\n        Call(first,\n             second);\n    }\n}\n"
    );
}

#[test]
fn column_zero_directives_stay_at_column_zero() {
    let source = "class A\n{\n#if DEBUG\n    int x;\n#endif\n}\n";
    let tree = parse_plain(source);
    assert_eq!(render_default(&tree), source);
}

#[test]
fn describe_leaves_out_comments_and_inactive_source() {
    let tree = parse_plain("class A\n{\n    int x = Compute(1, // one\n        2);\n}\n");
    let class = tree.children(tree.root())[0];
    let field = tree.children(class)[0];
    assert_eq!(describe(&tree, field), "int x = Compute(1, 2);");
}

#[test]
fn describe_sandwiched_declaration() {
    let tree = parse_plain("#if DEBUG\npublic\n#else\ninternal\n#endif\nstatic class Log\n{\n}\n");
    let class = tree.children(tree.root())[0];
    assert_eq!(describe(&tree, class), "internal static class Log { }");
}
