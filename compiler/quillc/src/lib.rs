//! Quill driver
//!
//! Entry points that tie the parser and renderer together: parse a source
//! string, check that it renders back unchanged, and parse many files in
//! parallel. The `quill` binary is a thin layer over [`commands`].
//!
//! Every file gets its own tree; nothing is shared between files, so
//! [`parse_files`] simply maps [`parse_file`] over a rayon iterator.

pub mod commands;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Once;

use quill_fmt::RenderConfig;
use quill_ir::{DiagnosticCounts, Tree};
use quill_parse::{ParseConfig, ParseError, ParseOutput};
use rayon::prelude::*;

pub use error::DriverError;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, and nothing on later calls.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Parse one source string.
pub fn parse_source(source: &str, config: &ParseConfig) -> ParseOutput {
    let _span = tracing::debug_span!("parse_source", bytes = source.len()).entered();
    quill_parse::parse(source, config)
}

/// Outcome of parsing and re-rendering a source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundTrip {
    /// The rendered tree.
    pub output: String,
    /// `output` is byte-for-byte the input.
    pub unchanged: bool,
    pub diagnostics: DiagnosticCounts,
}

/// Parse `source` and render it straight back.
pub fn round_trip(source: &str, parse: &ParseConfig, render: &RenderConfig) -> RoundTrip {
    let parsed = parse_source(source, parse);
    let output = quill_fmt::render(&parsed.tree, render);
    let unchanged = output == source;
    if !unchanged {
        tracing::debug!(
            input = source.len(),
            output = output.len(),
            "rendering differs from source"
        );
    }
    RoundTrip {
        unchanged,
        diagnostics: parsed.tree.diagnostic_counts(),
        output,
    }
}

/// A file and the tree parsed from it.
#[derive(Clone, Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
    /// Set if the parser gave up on the file.
    pub fatal: Option<ParseError>,
}

/// Read a source file.
pub fn read_source(path: &Path) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|e| DriverError::io(path, e))
}

/// Read and parse one file.
pub fn parse_file(path: &Path, config: &ParseConfig) -> Result<ParsedFile, DriverError> {
    let source = read_source(path)?;
    let ParseOutput { tree, fatal } = parse_source(&source, config);
    tracing::debug!(path = %path.display(), nodes = tree.len(), "parsed file");
    Ok(ParsedFile {
        path: path.to_path_buf(),
        source,
        tree,
        fatal,
    })
}

/// Parse files in parallel. Results come back in the order of `paths`.
pub fn parse_files(paths: &[PathBuf], config: &ParseConfig) -> Vec<Result<ParsedFile, DriverError>> {
    paths
        .par_iter()
        .map(|path| parse_file(path, config))
        .collect()
}

#[cfg(test)]
mod tests;
