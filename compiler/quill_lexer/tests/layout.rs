#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The token stream carries enough layout to rebuild the source exactly,
//! for sources without indentation or repeated spaces.

use proptest::prelude::*;
use quill_lexer::{lex, LexConfig};

const WORDS: &[&str] = &[
    "a", "foo", "1", "2.5", "(", ")", ";", "+", "==", "if", "public", "{", "}", "\"s\"", "x.y",
    "/* c */",
];

fn line() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop::sample::select(WORDS), 0..6),
        prop::bool::ANY,
    )
        .prop_map(|(words, comment)| {
            let mut line = words.join(" ");
            if comment {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str("// note");
            }
            line
        })
}

fn rebuild(source: &str) -> String {
    let output = lex(source, &LexConfig::default());
    let mut text = String::new();
    for token in output.tokens.iter() {
        for _ in 0..token.newlines {
            text.push('\n');
        }
        if token.newlines == 0 && token.space_before {
            text.push(' ');
        }
        text.push_str(&token.text);
        for comment in &token.trailing {
            if comment.space_before {
                text.push(' ');
            }
            text.push_str(&comment.text);
        }
    }
    text
}

proptest! {
    #[test]
    fn tokens_rebuild_the_source(lines in prop::collection::vec(line(), 0..8)) {
        let source = lines.join("\n");
        prop_assert_eq!(rebuild(&source), source);
    }
}

#[test]
fn rebuild_handles_comment_only_lines() {
    let source = "// a\nx /* b */ y // c\n\n/* d */";
    assert_eq!(rebuild(source), source);
}
