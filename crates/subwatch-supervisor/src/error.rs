//! Supervisor and inspector errors.

use std::time::Duration;

use subwatch_core::TaskId;
use subwatch_log::LogError;
use thiserror::Error;

/// Errors that abort a supervision run.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The batch's task directory never appeared.
    #[error("task dir not found after {}s", .waited.as_secs())]
    DirectoryNotFound { waited: Duration },
}

/// Errors that abort a single inspection.
#[derive(Debug, Error)]
pub enum InspectError {
    /// No log file exists for the task.
    #[error("no log found for task {0}")]
    LogNotFound(TaskId),

    /// Reading the log failed.
    #[error(transparent)]
    Log(#[from] LogError),
}
