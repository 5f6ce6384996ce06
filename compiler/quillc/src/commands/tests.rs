#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn roundtrip_file_renders_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "a.cs", "class A\r\n{\r\n    int x;\r\n}\r\n");
    let result = roundtrip_file(&path, &ParseConfig::default(), &RenderConfig::default()).unwrap();
    assert!(result.unchanged);

    let lf = RenderConfig::default().with_newline(quill_fmt::NewlineMode::Lf);
    let result = roundtrip_file(&path, &ParseConfig::default(), &lf).unwrap();
    assert!(!result.unchanged);
    assert_eq!(result.output, "class A\n{\n    int x;\n}\n");
}

#[test]
fn roundtrip_file_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.cs");
    let err = roundtrip_file(&path, &ParseConfig::default(), &RenderConfig::default()).unwrap_err();
    assert!(err.to_string().contains("nope.cs"));
}

#[test]
fn check_lists_diagnostics_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let clean = write(dir.path(), "clean.cs", "class A\n{\n}\n");
    let broken = write(dir.path(), "broken.cs", "class B\n{\n    int x = 1\n}\n");

    let report = check(&[clean, broken.clone()], &ParseConfig::default());
    assert_eq!(report.files, 2);
    assert_eq!(report.unreadable, 0);
    assert!(report.errors > 0);
    assert!(!report.is_clean());
    let prefix = format!("{}:3:5: error:", broken.display());
    assert!(
        report.messages.iter().any(|m| m.starts_with(&prefix) && m.contains("(in `int x = 1`)")),
        "{:?}",
        report.messages
    );
}

#[test]
fn check_counts_unreadable_files() {
    let dir = tempfile::tempdir().unwrap();
    let report = check(&[dir.path().join("missing.cs")], &ParseConfig::default());
    assert_eq!(report.files, 0);
    assert_eq!(report.unreadable, 1);
    assert!(!report.is_clean());
    assert_eq!(report.messages.len(), 1);
}

#[test]
fn clean_files_have_no_messages() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "ok.cs", "namespace N\n{\n    class A\n    {\n    }\n}\n");
    let report = check(&[path], &ParseConfig::default());
    assert!(report.is_clean());
    assert!(report.messages.is_empty());
}
