//! Detailed per-task report built by the inspector.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};
use subwatch_core::{ContentBlock, EventKind, EventRecord, TaskId};
use subwatch_log::{
    excerpt, find_terminal_marker, record_errors, LogSnapshot, TerminalMarker,
    INSPECT_EXCERPT_CHARS,
};

/// Default character budget for the final output.
pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Marker appended to a truncated final output.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Path segments that mark the start of a project-relative path.
const PROJECT_ROOT_MARKERS: &[&str] = &["packages", "crates", "apps", "libs", "services", "src"];

/// Tools whose calls modify a file.
const FILE_WRITING_TOOLS: &[(&str, &str)] = &[
    ("Write", "file_path"),
    ("Edit", "file_path"),
    ("MultiEdit", "file_path"),
    ("NotebookEdit", "notebook_path"),
];

/// Budget for each argument value kept in a tool call record.
const ARGUMENT_CHARS: usize = 100;

/// Compact record of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCall {
    pub name: String,
    /// Argument values rendered as (truncated) strings.
    pub arguments: BTreeMap<String, String>,
}

impl ToolCall {
    fn new(name: &str, input: &Map<String, Value>) -> Self {
        let arguments = input
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), excerpt(&rendered, ARGUMENT_CHARS))
            })
            .collect();
        Self {
            name: name.to_string(),
            arguments,
        }
    }
}

/// Collapse everything before the first project-root marker into `…`.
///
/// `/home/me/repo/packages/foo/bar.go` becomes `…/packages/foo/bar.go`.
/// Paths without a marker, or starting with one, are returned unchanged.
pub fn shorten_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let marker = segments
        .iter()
        .position(|segment| PROJECT_ROOT_MARKERS.contains(segment));

    match marker {
        Some(index) if index > 0 && segments[..index].iter().any(|s| !s.is_empty()) => {
            format!("…/{}", segments[index..].join("/"))
        }
        _ => path.to_string(),
    }
}

/// Options for a single inspection.
#[derive(Debug, Clone)]
pub struct InspectOptions {
    /// Session/scope to look in first.
    pub scope: Option<String>,
    /// Character budget for the final output.
    pub max_chars: usize,
    /// Disable final-output truncation.
    pub full: bool,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            scope: None,
            max_chars: DEFAULT_MAX_CHARS,
            full: false,
        }
    }
}

/// Digest of one task's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub task_id: TaskId,
    pub log_path: PathBuf,
    /// Terminal marker, if the task has finished.
    pub terminal: Option<TerminalMarker>,
    pub tool_calls: Vec<ToolCall>,
    pub text_blocks: usize,
    pub errors: Vec<String>,
    /// Sorted, deduplicated, shortened paths written by the task.
    pub modified_files: Vec<String>,
    /// Last assistant text block, possibly truncated.
    pub final_output: Option<String>,
    pub truncated: bool,
}

impl Report {
    /// Build a report from a log snapshot.
    pub fn from_snapshot(
        task_id: TaskId,
        snapshot: &LogSnapshot,
        options: &InspectOptions,
    ) -> Self {
        let mut builder = ReportBuilder::default();
        for record in snapshot.records() {
            builder.add(&record);
        }

        let (final_output, truncated) = match builder.last_text {
            Some(text) if !options.full && text.chars().count() > options.max_chars => {
                let kept: String = text.chars().take(options.max_chars).collect();
                (Some(format!("{}\n{}", kept, TRUNCATION_MARKER)), true)
            }
            other => (other, false),
        };

        Self {
            task_id,
            log_path: snapshot.path.clone(),
            terminal: find_terminal_marker(&snapshot.content),
            tool_calls: builder.tool_calls,
            text_blocks: builder.text_blocks,
            errors: builder.errors,
            modified_files: builder
                .modified_files
                .iter()
                .map(|p| shorten_path(p))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            final_output,
            truncated,
        }
    }

    pub fn tool_call_count(&self) -> usize {
        self.tool_calls.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of calls per tool name, sorted by name.
    pub fn tool_usage(&self) -> BTreeMap<&str, usize> {
        let mut usage = BTreeMap::new();
        for call in &self.tool_calls {
            *usage.entry(call.name.as_str()).or_insert(0) += 1;
        }
        usage
    }

    /// Render the human-readable digest.
    ///
    /// Output depends only on the report, so inspecting an unchanged log
    /// twice yields identical text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let status = match self.terminal {
            Some(marker) => format!("finished ({})", marker),
            None => "running (no terminal marker yet)".to_string(),
        };

        let _ = writeln!(out, "Task:    {}", self.task_id);
        let _ = writeln!(out, "Log:     {}", self.log_path.display());
        let _ = writeln!(out, "Status:  {}", status);
        let _ = writeln!(
            out,
            "Summary: {} tool calls, {} text blocks, {} errors",
            self.tool_call_count(),
            self.text_blocks,
            self.error_count()
        );

        if !self.tool_calls.is_empty() {
            let usage: Vec<String> = self
                .tool_usage()
                .into_iter()
                .map(|(name, count)| format!("{} x{}", name, count))
                .collect();
            let _ = writeln!(out, "Tools:   {}", usage.join(", "));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Modified files ({}):", self.modified_files.len());
        if self.modified_files.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for path in &self.modified_files {
            let _ = writeln!(out, "  {}", path);
        }

        if !self.errors.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Errors ({}):", self.errors.len());
            for (i, error) in self.errors.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, error);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Final output:");
        match &self.final_output {
            Some(text) => {
                let _ = writeln!(out, "{}", text);
            }
            None => {
                let _ = writeln!(out, "(no text output)");
            }
        }

        out
    }
}

/// Accumulates report fields while walking records in stream order.
#[derive(Default)]
struct ReportBuilder {
    tool_calls: Vec<ToolCall>,
    text_blocks: usize,
    last_text: Option<String>,
    errors: Vec<String>,
    modified_files: BTreeSet<String>,
}

impl ReportBuilder {
    fn add(&mut self, record: &EventRecord) {
        for block in record.blocks() {
            match block {
                ContentBlock::Text { text } if record.kind == EventKind::Assistant => {
                    self.text_blocks += 1;
                    self.last_text = Some(text.clone());
                }
                ContentBlock::ToolUse { name, input, .. } => {
                    self.tool_calls.push(ToolCall::new(name, input));
                    let path_arg = FILE_WRITING_TOOLS
                        .iter()
                        .find(|(tool, _)| tool == name)
                        .and_then(|(_, arg)| input.get(*arg))
                        .and_then(Value::as_str);
                    if let Some(path) = path_arg {
                        self.modified_files.insert(path.to_string());
                    }
                }
                _ => {}
            }
        }
        self.errors.extend(record_errors(record, INSPECT_EXCERPT_CHARS));
    }
}
