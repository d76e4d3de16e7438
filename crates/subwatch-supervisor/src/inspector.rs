//! On-demand detailed inspection of a single task log.

use std::path::PathBuf;

use subwatch_core::TaskId;
use subwatch_log::{find_task_log, FullReread, LogReader};
use tracing::{debug, info};

use crate::config::SupervisorConfig;
use crate::error::InspectError;
use crate::report::{InspectOptions, Report};

/// Locates one task's log and digests it into a [`Report`].
#[derive(Debug, Clone)]
pub struct Inspector<R = FullReread> {
    config: SupervisorConfig,
    reader: R,
}

impl Inspector<FullReread> {
    pub fn new(config: SupervisorConfig) -> Self {
        Self::with_reader(config, FullReread)
    }
}

impl<R: LogReader> Inspector<R> {
    pub fn with_reader(config: SupervisorConfig, reader: R) -> Self {
        Self { config, reader }
    }

    /// Path of the task's log, if one exists.
    ///
    /// One-shot lookup: the configured task directory, else the scope hint
    /// (from `options`, then from the config), else a scan of every root.
    pub async fn locate(&self, task_id: &TaskId, options: &InspectOptions) -> Option<PathBuf> {
        if let Some(dir) = &self.config.task_dir {
            let path = dir.join(task_id.log_file_name());
            return tokio::fs::metadata(&path)
                .await
                .ok()
                .filter(|m| m.is_file())
                .map(|_| path);
        }

        let scope = options
            .scope
            .as_deref()
            .or(self.config.scope.as_deref())
            .filter(|s| !s.is_empty());
        find_task_log(&self.config.roots, task_id, scope).await
    }

    /// Build the report for `task_id`.
    pub async fn inspect(
        &self,
        task_id: &TaskId,
        options: &InspectOptions,
    ) -> Result<Report, InspectError> {
        let path = self
            .locate(task_id, options)
            .await
            .ok_or_else(|| InspectError::LogNotFound(task_id.clone()))?;
        debug!(task_id = %task_id, path = %path.display(), "Inspecting task log");

        let snapshot = self
            .reader
            .read(&path)
            .await?
            .ok_or_else(|| InspectError::LogNotFound(task_id.clone()))?;

        let report = Report::from_snapshot(task_id.clone(), &snapshot, options);
        info!(
            task_id = %task_id,
            tool_calls = report.tool_call_count(),
            errors = report.error_count(),
            "Task inspected"
        );
        Ok(report)
    }
}
