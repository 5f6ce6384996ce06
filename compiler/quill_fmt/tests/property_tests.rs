#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Property tests over generated method bodies: canonical sources render
//! unchanged, and rendering is a fixed point under re-parsing, with or
//! without edits in between.

use proptest::prelude::*;

use quill_fmt::{render, RenderConfig};
use quill_ir::{NodeKind, TokenRun, Tree};
use quill_parse::{parse, ParseConfig};

#[derive(Clone, Debug)]
enum Stmt {
    Call(&'static str),
    Local(&'static str, u8),
    Comment(&'static str),
    Return(Option<&'static str>),
    If(&'static str, Body, Option<Body>),
    While(&'static str, Body),
    Block(Vec<Line>),
}

/// A statement with an optional blank line before it.
#[derive(Clone, Debug)]
struct Line {
    blank: bool,
    stmt: Stmt,
}

#[derive(Clone, Debug)]
enum Body {
    /// One call or `return` on the next line, no braces.
    Single(Box<Stmt>),
    Braced(Vec<Line>),
}

const CALLS: &[&str] = &["Run()", "Log(\"hi\")", "items.Add(1)", "x = y + 2", "Go(a, b)"];
const CONDITIONS: &[&str] = &["(ready)", "(count > 0)", "(a && !b)"];
const COMMENTS: &[&str] = &["// note", "/* block */", "// TODO later"];

fn simple() -> impl Strategy<Value = Stmt> {
    prop_oneof![
        prop::sample::select(CALLS).prop_map(Stmt::Call),
        (prop::sample::select(&["count", "total"][..]), 0u8..10)
            .prop_map(|(name, value)| Stmt::Local(name, value)),
        prop::sample::select(COMMENTS).prop_map(Stmt::Comment),
        prop::option::of(prop::sample::select(&["x", "count + 1"][..])).prop_map(Stmt::Return),
    ]
}

fn single() -> impl Strategy<Value = Stmt> {
    prop_oneof![
        prop::sample::select(CALLS).prop_map(Stmt::Call),
        Just(Stmt::Return(None)),
    ]
}

fn lines(stmt: impl Strategy<Value = Stmt>) -> impl Strategy<Value = Vec<Line>> {
    prop::collection::vec(
        (prop::bool::weighted(0.2), stmt).prop_map(|(blank, stmt)| Line { blank, stmt }),
        0..4,
    )
}

fn stmt() -> impl Strategy<Value = Stmt> {
    simple().prop_recursive(3, 24, 4, |inner| {
        let body = prop_oneof![
            single().prop_map(|stmt| Body::Single(Box::new(stmt))),
            lines(inner.clone()).prop_map(Body::Braced),
        ]
        .boxed();
        prop_oneof![
            (
                prop::sample::select(CONDITIONS),
                body.clone(),
                prop::option::of(body.clone())
            )
                .prop_map(|(cond, then, otherwise)| Stmt::If(cond, then, otherwise)),
            (prop::sample::select(CONDITIONS), body).prop_map(|(cond, body)| Stmt::While(cond, body)),
            lines(inner).prop_map(Stmt::Block),
        ]
    })
}

struct Printer {
    out: String,
    indent: &'static str,
}

impl Printer {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn lines(&mut self, depth: usize, lines: &[Line]) {
        for line in lines {
            if line.blank {
                self.out.push('\n');
            }
            self.stmt(depth, &line.stmt);
        }
    }

    fn braced(&mut self, depth: usize, lines: &[Line]) {
        self.line(depth, "{");
        self.lines(depth + 1, lines);
        self.line(depth, "}");
    }

    fn body(&mut self, depth: usize, body: &Body) {
        match body {
            Body::Single(stmt) => self.stmt(depth + 1, stmt),
            Body::Braced(lines) => self.braced(depth, lines),
        }
    }

    fn stmt(&mut self, depth: usize, stmt: &Stmt) {
        match stmt {
            Stmt::Call(call) => self.line(depth, &format!("{call};")),
            Stmt::Local(name, value) => self.line(depth, &format!("int {name} = {value};")),
            Stmt::Comment(text) => self.line(depth, text),
            Stmt::Return(None) => self.line(depth, "return;"),
            Stmt::Return(Some(value)) => self.line(depth, &format!("return {value};")),
            Stmt::If(cond, then, otherwise) => {
                self.line(depth, &format!("if {cond}"));
                self.body(depth, then);
                if let Some(otherwise) = otherwise {
                    self.line(depth, "else");
                    self.body(depth, otherwise);
                }
            }
            Stmt::While(cond, body) => {
                self.line(depth, &format!("while {cond}"));
                self.body(depth, body);
            }
            Stmt::Block(lines) => self.braced(depth, lines),
        }
    }
}

fn source(body: &[Line], indent: &'static str) -> String {
    let mut printer = Printer {
        out: String::new(),
        indent,
    };
    printer.line(0, "class Generated");
    printer.line(0, "{");
    printer.line(1, "void Run()");
    printer.braced(1, body);
    printer.line(0, "}");
    printer.out
}

fn parse_tree(source: &str) -> Tree {
    let output = parse(source, &ParseConfig::default());
    assert_eq!(output.fatal, None);
    output.tree
}

fn render_tree(tree: &Tree) -> String {
    render(tree, &RenderConfig::default())
}

#[derive(Clone, Debug)]
enum Edit {
    Remove(usize),
    Append(&'static str),
    Insert(usize, &'static str),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..4).prop_map(Edit::Remove),
        prop::sample::select(CALLS).prop_map(Edit::Append),
        (0usize..4, prop::sample::select(CALLS)).prop_map(|(i, call)| Edit::Insert(i, call)),
    ]
}

/// Apply `edits` to the body of the generated method.
fn apply(tree: &mut Tree, edits: &[Edit]) {
    let class = tree.children(tree.root())[0];
    let method = tree.children(class)[0];
    for edit in edits {
        let len = tree.children(method).len();
        match *edit {
            Edit::Remove(i) => {
                if i < len {
                    tree.edit_block(method).unwrap().remove_at(i);
                }
            }
            Edit::Append(call) | Edit::Insert(_, call) => {
                let id = tree.alloc(NodeKind::Expression(TokenRun::from_text(call)));
                tree.set_newlines(id, 1);
                let mut editor = tree.edit_block(method).unwrap();
                match *edit {
                    Edit::Insert(i, _) => {
                        editor.insert(i.min(len), id);
                    }
                    _ => {
                        editor.add(id);
                    }
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn canonical_sources_render_unchanged(body in lines(stmt())) {
        let text = source(&body, "    ");
        let tree = parse_tree(&text);
        prop_assert_eq!(tree.diagnostic_counts().total(), 0);
        prop_assert_eq!(render_tree(&tree), text);
    }

    #[test]
    fn rendering_is_a_fixed_point(body in lines(stmt())) {
        let text = source(&body, "  ");
        let first = render_tree(&parse_tree(&text));
        prop_assert_eq!(&first, &source(&body, "    "));
        let second = render_tree(&parse_tree(&first));
        prop_assert_eq!(second, first);
    }

    #[test]
    fn edited_trees_render_stably(
        body in lines(stmt()),
        edits in prop::collection::vec(edit(), 1..5),
    ) {
        let mut tree = parse_tree(&source(&body, "    "));
        apply(&mut tree, &edits);
        let first = render_tree(&tree);
        let second = render_tree(&parse_tree(&first));
        prop_assert_eq!(second, first);
    }
}
