//! Batch supervision: wait for every task log to reach a terminal state.

use std::path::PathBuf;
use std::time::Duration;

use subwatch_core::{PollOutcome, Summary, TaskId, TaskReport};
use subwatch_log::{
    extract_errors, find_terminal_marker, single_line, wait_for_task_dir, FullReread, LogReader,
    POLL_EXCERPT_CHARS,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SupervisorConfig;
use crate::error::SupervisorError;

/// Per-task polling state.
#[derive(Debug)]
struct TaskState {
    id: TaskId,
    path: PathBuf,
    outcome: PollOutcome,
}

/// Polls a batch of task logs until all are terminal or a timeout elapses.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use subwatch_core::TaskId;
/// use subwatch_supervisor::{Supervisor, SupervisorConfig};
///
/// async fn run() -> Result<(), Box<dyn std::error::Error>> {
///     let supervisor = Supervisor::new(SupervisorConfig::default());
///     let ids = TaskId::batch(["t1", "t2"])?;
///
///     let summary = supervisor.supervise(&ids, Duration::from_secs(600)).await?;
///     for line in summary.protocol_lines() {
///         println!("{}", line);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Supervisor<R = FullReread> {
    config: SupervisorConfig,
    reader: R,
}

impl Supervisor<FullReread> {
    /// Create a supervisor that re-reads each log in full on every tick.
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_reader(config, FullReread)
    }
}

impl<R: LogReader> Supervisor<R> {
    /// Create a supervisor with a custom log reader.
    pub fn with_reader(config: SupervisorConfig, reader: R) -> Self {
        Self { config, reader }
    }

    /// Resolve the directory holding the batch's logs.
    ///
    /// An explicitly configured directory wins; otherwise the candidate roots
    /// are scanned (narrowed to the configured scope, if any) until the
    /// discovery window elapses.
    pub async fn resolve_task_dir(&self, ids: &[TaskId]) -> Result<PathBuf, SupervisorError> {
        if let Some(dir) = &self.config.task_dir {
            debug!(dir = %dir.display(), "Using configured task directory");
            return Ok(dir.clone());
        }

        wait_for_task_dir(
            &self.config.roots,
            self.config.scope.as_deref(),
            ids,
            self.config.discovery_window,
            self.config.discovery_interval,
        )
        .await
        .ok_or(SupervisorError::DirectoryNotFound {
            waited: self.config.discovery_window,
        })
    }

    /// Supervise `ids` until every log is terminal or `timeout` elapses.
    ///
    /// Tasks are reported in the order given. A task with failed tool
    /// results is still terminal; it is reported as `Failed`.
    pub async fn supervise(
        &self,
        ids: &[TaskId],
        timeout: Duration,
    ) -> Result<Summary, SupervisorError> {
        let task_dir = self.resolve_task_dir(ids).await?;
        info!(
            dir = %task_dir.display(),
            tasks = ids.len(),
            timeout_secs = timeout.as_secs(),
            "Supervising tasks"
        );

        let mut states: Vec<TaskState> = ids
            .iter()
            .map(|id| TaskState {
                path: task_dir.join(id.log_file_name()),
                id: id.clone(),
                outcome: PollOutcome::Pending,
            })
            .collect();

        let started = Instant::now();
        let mut tick = 0u64;

        loop {
            tick += 1;
            for state in states
                .iter_mut()
                .filter(|s| s.outcome == PollOutcome::Pending)
            {
                self.poll_task(state).await;
            }

            let pending = states
                .iter()
                .filter(|s| s.outcome == PollOutcome::Pending)
                .count();
            debug!(tick, pending, "Poll tick complete");

            if pending == 0 {
                info!(
                    tick,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "All tasks terminal"
                );
                let reports = states
                    .into_iter()
                    .map(|s| TaskReport::new(s.id, s.outcome))
                    .collect();
                return Ok(Summary::AllDone(reports));
            }

            if started.elapsed() >= timeout {
                let mut timed_out = Vec::with_capacity(pending);
                for state in states
                    .iter_mut()
                    .filter(|s| s.outcome == PollOutcome::Pending)
                {
                    state.outcome = PollOutcome::TimedOut;
                    timed_out.push(state.id.clone());
                }
                warn!(pending = timed_out.len(), tick, "Supervision timed out");
                return Ok(Summary::TimedOut(timed_out));
            }

            tokio::time::sleep(self.config.tick_interval).await;
        }
    }

    /// Re-read one pending task and classify it once it is terminal.
    async fn poll_task(&self, state: &mut TaskState) {
        let snapshot = match self.reader.read(&state.path).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(task_id = %state.id, "Log not created yet");
                return;
            }
            Err(e) => {
                warn!(task_id = %state.id, error = %e, "Failed to read task log");
                return;
            }
        };

        let Some(marker) = find_terminal_marker(&snapshot.content) else {
            return;
        };

        let errors: Vec<String> = extract_errors(&snapshot.content, POLL_EXCERPT_CHARS)
            .iter()
            .map(|e| single_line(e.as_str()))
            .collect();
        state.outcome = PollOutcome::from_errors(&errors);
        info!(
            task_id = %state.id,
            marker = %marker,
            errors = errors.len(),
            "Task reached terminal state"
        );
    }
}
