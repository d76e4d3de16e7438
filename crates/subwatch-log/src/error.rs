//! Error types for log access.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading task logs.
#[derive(Debug, Error)]
pub enum LogError {
    /// Reading a log file or scanning a directory failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
