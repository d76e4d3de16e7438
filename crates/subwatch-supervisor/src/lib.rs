//! Supervision of subagent task batches
//!
//! [`Supervisor`] waits for a batch of task logs to reach a terminal state
//! and classifies each as OK or failed; [`Inspector`] digests a single task
//! log into a human-readable [`Report`].

mod config;
mod error;
mod inspector;
mod report;
mod supervisor;

pub use config::{default_roots, SupervisorConfig};
pub use error::{InspectError, SupervisorError};
pub use inspector::Inspector;
pub use report::{
    shorten_path, InspectOptions, Report, ToolCall, DEFAULT_MAX_CHARS, TRUNCATION_MARKER,
};
pub use supervisor::Supervisor;
