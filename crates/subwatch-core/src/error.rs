//! Core domain errors.

use thiserror::Error;

/// Core domain errors for subwatch.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A task id was empty or contained a path separator.
    #[error("Invalid task id: {0:?}")]
    InvalidTaskId(String),

    /// No task ids were requested.
    #[error("At least one task id is required")]
    EmptyBatch,
}
