//! Event-log primitives for subwatch
//!
//! This crate reads the newline-delimited JSON logs that subagent workers
//! append to, and answers the questions the supervisor and inspector ask of
//! them: where is the batch's log directory, has a task finished, and which
//! tool calls failed.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use subwatch_log::{is_terminal, extract_errors, FullReread, LogReader, POLL_EXCERPT_CHARS};
//!
//! async fn check(path: &Path) -> Result<(), subwatch_log::LogError> {
//!     if let Some(snapshot) = FullReread.read(path).await? {
//!         if is_terminal(&snapshot.content) {
//!             let errors = extract_errors(&snapshot.content, POLL_EXCERPT_CHARS);
//!             println!("finished with {} errors", errors.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod detector;
mod error;
mod extract;
mod locate;
mod stream;

pub use detector::{find_terminal_marker, is_terminal, TerminalMarker};
pub use error::LogError;
pub use extract::{
    excerpt, extract_errors, record_errors, single_line, INSPECT_EXCERPT_CHARS,
    POLL_EXCERPT_CHARS,
};
pub use locate::{
    find_task_log, scan_once, wait_for_task_dir, DEFAULT_DISCOVERY_INTERVAL,
    DEFAULT_DISCOVERY_WINDOW, TASKS_DIR,
};
pub use stream::{parse_line, records, FullReread, LogReader, LogSnapshot};
