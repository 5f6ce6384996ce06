//! Driver errors.
//!
//! Only I/O can fail here; problems in the source itself are diagnostics
//! on the parsed tree.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DriverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriverError::Io {
            path: path.into(),
            source,
        }
    }

    /// File the error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            DriverError::Io { path, .. } => path,
        }
    }
}
