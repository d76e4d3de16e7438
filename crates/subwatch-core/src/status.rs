//! Poll outcomes, batch summaries and the exit-code contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::TaskId;

/// Classification of one task within a polling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollOutcome {
    /// No terminal marker seen yet.
    #[default]
    Pending,
    /// Terminal, no failed tool results.
    Ok,
    /// Terminal, with at least one failed tool result.
    Failed {
        error_count: usize,
        first_excerpt: String,
    },
    /// Still pending when the supervision timeout elapsed.
    TimedOut,
}

impl PollOutcome {
    /// Build the outcome of a terminal task from its error excerpts.
    pub fn from_errors(errors: &[String]) -> Self {
        match errors.first() {
            None => Self::Ok,
            Some(first) => Self::Failed {
                error_count: errors.len(),
                first_excerpt: first.clone(),
            },
        }
    }

    /// Returns true once the outcome is decided.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ok | Self::Failed { .. })
    }

    /// Returns true for a terminal task that reported errors.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-task line of a completed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    pub task_id: TaskId,
    pub outcome: PollOutcome,
}

impl TaskReport {
    pub fn new(task_id: TaskId, outcome: PollOutcome) -> Self {
        Self { task_id, outcome }
    }
}

/// Renders the pipe-delimited protocol line (`OK|id` / `FAIL|id|n errors|excerpt`).
impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            PollOutcome::Failed {
                error_count,
                first_excerpt,
            } => write!(
                f,
                "FAIL|{}|{} errors|{}",
                self.task_id, error_count, first_excerpt
            ),
            PollOutcome::Ok => write!(f, "OK|{}", self.task_id),
            PollOutcome::Pending => write!(f, "PENDING|{}", self.task_id),
            PollOutcome::TimedOut => write!(f, "TIMEOUT|{}", self.task_id),
        }
    }
}

/// Result of supervising a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "tasks", rename_all = "snake_case")]
pub enum Summary {
    /// Every task reached a terminal state, in request order.
    AllDone(Vec<TaskReport>),
    /// The timeout elapsed; ids still pending, in request order.
    TimedOut(Vec<TaskId>),
}

impl Summary {
    /// Stdout protocol lines for this summary.
    pub fn protocol_lines(&self) -> Vec<String> {
        match self {
            Self::AllDone(reports) => std::iter::once("DONE".to_string())
                .chain(reports.iter().map(ToString::to_string))
                .collect(),
            Self::TimedOut(pending) => {
                let ids: Vec<&str> = pending.iter().map(TaskId::as_str).collect();
                vec![format!("TIMEOUT|pending={}", ids.join(","))]
            }
        }
    }

    /// Process exit status implied by this summary.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::AllDone(reports) if reports.iter().any(|r| r.outcome.is_failure()) => {
                ExitStatus::Failure
            }
            Self::AllDone(_) => ExitStatus::Success,
            Self::TimedOut(_) => ExitStatus::Timeout,
        }
    }
}

/// Exit codes consumed by the orchestrating process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// All tasks terminal without errors (or a report was produced).
    Success,
    /// Tasks reported errors, or a directory/log could not be found.
    Failure,
    /// The supervision timeout elapsed with tasks pending.
    Timeout,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Timeout => 2,
        }
    }
}
