//! Newtype wrapper for task identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// File extension of a task's event log.
pub const LOG_EXTENSION: &str = "output";

/// Opaque identifier for one subagent task, assigned by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new TaskId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a TaskId, rejecting values that cannot name a log file.
    pub fn parse(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(CoreError::InvalidTaskId(id));
        }
        Ok(Self(id))
    }

    /// Build a polling batch: validates every id and drops duplicates,
    /// keeping the order in which ids were first given.
    pub fn batch<I, S>(ids: I) -> Result<Vec<Self>, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut batch: Vec<Self> = Vec::new();
        for id in ids {
            let id = Self::parse(id)?;
            if !batch.contains(&id) {
                batch.push(id);
            }
        }
        if batch.is_empty() {
            return Err(CoreError::EmptyBatch);
        }
        Ok(batch)
    }

    /// Name of the log file backing this task (`<id>.output`).
    pub fn log_file_name(&self) -> String {
        format!("{}.{}", self.0, LOG_EXTENSION)
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        assert_eq!(TaskId::new("a1b2").log_file_name(), "a1b2.output");
    }

    #[test]
    fn test_parse_rejects_paths() {
        assert!(TaskId::parse("../etc").is_err());
        assert!(TaskId::parse("a/b").is_err());
        assert!(TaskId::parse("  ").is_err());
        assert!(TaskId::parse("..").is_err());
        assert!(TaskId::parse("t1").is_ok());
    }

    #[test]
    fn test_batch_dedups_in_order() {
        let batch = TaskId::batch(["t2", "t1", "t2", "t3"]).unwrap();
        let ids: Vec<&str> = batch.iter().map(TaskId::as_str).collect();
        assert_eq!(ids, vec!["t2", "t1", "t3"]);
    }

    #[test]
    fn test_batch_empty() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(TaskId::batch(empty), Err(CoreError::EmptyBatch)));
    }
}
