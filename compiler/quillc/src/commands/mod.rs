//! Command handlers for the `quill` binary.
//!
//! Handlers compute their results and leave printing to `main`, so the
//! same code runs under the tests.

use std::path::{Path, PathBuf};

use quill_fmt::RenderConfig;
use quill_parse::ParseConfig;

use crate::{parse_files, read_source, round_trip, DriverError, ParsedFile, RoundTrip};

/// Parse `path` and render it back.
pub fn roundtrip_file(
    path: &Path,
    parse: &ParseConfig,
    render: &RenderConfig,
) -> Result<RoundTrip, DriverError> {
    let source = read_source(path)?;
    let result = round_trip(&source, parse, render);
    tracing::info!(
        path = %path.display(),
        unchanged = result.unchanged,
        errors = result.diagnostics.errors,
        "round trip"
    );
    Ok(result)
}

/// Result of checking a set of files.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Files that were read and parsed.
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Files that could not be read.
    pub unreadable: usize,
    /// One line per diagnostic or unreadable file, in input order.
    pub messages: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.unreadable == 0
    }
}

/// Parse every file and collect its diagnostics.
pub fn check(paths: &[PathBuf], config: &ParseConfig) -> CheckReport {
    let mut report = CheckReport::default();
    for result in parse_files(paths, config) {
        match result {
            Ok(file) => {
                report.files += 1;
                let counts = file.tree.diagnostic_counts();
                report.errors += counts.errors;
                report.warnings += counts.warnings;
                report.messages.extend(diagnostic_lines(&file));
            }
            Err(err) => {
                report.unreadable += 1;
                report.messages.push(format!("error: {err}"));
            }
        }
    }
    report
}

/// `path:line:col: severity: message`, followed by the offending node in
/// one line.
pub fn diagnostic_lines(file: &ParsedFile) -> Vec<String> {
    let path = file.path.display();
    let mut lines: Vec<(quill_ir::Position, String)> = file
        .tree
        .diagnostics()
        .into_iter()
        .map(|d| {
            let mut line = format!("{path}:{}: {}: {}", d.pos, d.severity.as_str(), d.text);
            if d.node != file.tree.root() {
                let context = quill_fmt::describe(&file.tree, d.node);
                if !context.is_empty() {
                    line = format!("{line} (in `{context}`)");
                }
            }
            (d.pos, line)
        })
        .collect();
    lines.sort_by_key(|(pos, _)| (pos.line, pos.column));
    lines.into_iter().map(|(_, line)| line).collect()
}

#[cfg(test)]
mod tests;
