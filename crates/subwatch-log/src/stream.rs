//! Tolerant reading of a concurrently written task log.
//!
//! A task log is newline-delimited JSON appended by a worker process that
//! never coordinates with readers. Every line is decoded on its own; blank
//! lines, malformed lines and a torn trailing line are skipped for the
//! current read and picked up again once the worker has flushed them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use subwatch_core::EventRecord;
use tracing::trace;

use crate::error::LogError;

/// Decode one log line. Returns `None` for blank or malformed lines.
pub fn parse_line(line: &str) -> Option<EventRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<EventRecord>(trimmed) {
        Ok(record) => Some(record),
        Err(e) => {
            let preview: String = trimmed.chars().take(80).collect();
            trace!(error = %e, preview = %preview, "Skipping undecodable log line");
            None
        }
    }
}

/// Decoded records of `content` in stream order.
pub fn records(content: &str) -> impl Iterator<Item = EventRecord> + '_ {
    content.lines().filter_map(parse_line)
}

/// Content of one task log as observed by a single read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSnapshot {
    pub path: PathBuf,
    pub content: String,
}

impl LogSnapshot {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Decoded records in stream order.
    pub fn records(&self) -> impl Iterator<Item = EventRecord> + '_ {
        records(&self.content)
    }
}

/// Source of task log snapshots.
///
/// The supervisor only needs "the current content of this log"; how it is
/// obtained (full re-read, incremental tail) is up to the implementation.
#[async_trait]
pub trait LogReader: Send + Sync {
    /// Read the current content of the log at `path`.
    ///
    /// Returns `Ok(None)` if the worker has not created the file yet.
    async fn read(&self, path: &Path) -> Result<Option<LogSnapshot>, LogError>;
}

/// Reader that re-reads the whole file on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullReread;

#[async_trait]
impl LogReader for FullReread {
    async fn read(&self, path: &Path) -> Result<Option<LogSnapshot>, LogError> {
        match tokio::fs::read(path).await {
            // Lossy decoding: a torn multi-byte sequence at the tail must not
            // fail the whole read.
            Ok(bytes) => Ok(Some(LogSnapshot::new(
                path,
                String::from_utf8_lossy(&bytes).into_owned(),
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LogError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subwatch_core::EventKind;
    use tempfile::TempDir;

    #[test]
    fn test_malformed_lines_are_skipped() {
        let content = concat!(
            "{\"type\":\"system\",\"subtype\":\"init\"}\n",
            "not json at all\n",
            "\n",
            "{\"type\":\"assistant\",\"message\":{\"content\":[]}}\n",
            "{\"type\":\"user\",\"mess"
        );

        let kinds: Vec<EventKind> = records(content).map(|r| r.kind).collect();
        assert_eq!(kinds, vec![EventKind::System, EventKind::Assistant]);
    }

    #[test]
    fn test_complete_trailing_line_without_newline() {
        let content = "{\"type\":\"system\"}\n{\"type\":\"result\"}";
        assert_eq!(records(content).count(), 2);
    }

    #[tokio::test]
    async fn test_full_reread_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.output");

        let snapshot = FullReread.read(&path).await.unwrap();
        assert!(snapshot.is_none());
    }

    #[tokio::test]
    async fn test_full_reread_sees_appended_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t1.output");

        std::fs::write(&path, "{\"type\":\"system\"}\n").unwrap();
        let first = FullReread.read(&path).await.unwrap().unwrap();
        assert_eq!(first.records().count(), 1);

        std::fs::write(&path, "{\"type\":\"system\"}\n{\"type\":\"result\"}\n").unwrap();
        let second = FullReread.read(&path).await.unwrap().unwrap();
        assert_eq!(second.records().count(), 2);
        assert_eq!(second.path, path);
    }

    #[tokio::test]
    async fn test_full_reread_tolerates_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("t1.output");

        let mut bytes = b"{\"type\":\"result\"}\n{\"type\":\"assistant\",\"x\":\"".to_vec();
        bytes.push(0xE2);
        std::fs::write(&path, bytes).unwrap();

        let snapshot = FullReread.read(&path).await.unwrap().unwrap();
        assert_eq!(snapshot.records().count(), 1);
    }
}
