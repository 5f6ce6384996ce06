#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

const PROGRAM: &str = "using System;\n\nclass Program\n{\n    // entry\n    static void Main()\n    {\n        Run();\n    }\n}\n";

#[test]
fn round_trip_reports_an_unchanged_source() {
    let result = round_trip(PROGRAM, &ParseConfig::default(), &RenderConfig::default());
    assert!(result.unchanged);
    assert_eq!(result.output, PROGRAM);
    assert_eq!(result.diagnostics.total(), 0);
}

#[test]
fn round_trip_reports_reindented_output() {
    let source = "class A\n{\n  int x;\n}\n";
    let result = round_trip(source, &ParseConfig::default(), &RenderConfig::default());
    assert!(!result.unchanged);
    assert_eq!(result.output, "class A\n{\n    int x;\n}\n");
}

#[test]
fn round_trip_counts_diagnostics() {
    let source = "class A\n{\n    int x = 1\n}\n";
    let result = round_trip(source, &ParseConfig::default(), &RenderConfig::default());
    assert!(result.unchanged);
    assert!(result.diagnostics.errors > 0);
}

#[test]
fn parse_files_keeps_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..8 {
        let path = dir.path().join(format!("file{i}.cs"));
        std::fs::write(&path, format!("class C{i}\n{{\n}}\n")).unwrap();
        paths.push(path);
    }
    let missing = dir.path().join("missing.cs");
    paths.push(missing.clone());

    let results = parse_files(&paths, &ParseConfig::default());
    assert_eq!(results.len(), 9);
    for (i, result) in results.iter().take(8).enumerate() {
        let file = result.as_ref().unwrap();
        assert_eq!(file.path, paths[i]);
        assert_eq!(file.fatal, None);
        let class = file.tree.children(file.tree.root())[0];
        assert_eq!(quill_fmt::describe(&file.tree, class), format!("class C{i} {{ }}"));
    }
    let err = results[8].as_ref().unwrap_err();
    assert_eq!(err.path(), missing.as_path());
    assert!(matches!(err, DriverError::Io { .. }));
}

#[test]
fn init_tracing_can_run_twice() {
    init_tracing();
    init_tracing();
}
