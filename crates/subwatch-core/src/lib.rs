//! subwatch Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Filesystem access
//! - Async runtime
//! - Process exit handling
//!
//! All types here describe subagent event logs and the outcome of
//! supervising a batch of them.

pub mod error;
pub mod event;
pub mod ids;
pub mod status;

// Re-export commonly used types
pub use error::CoreError;
pub use event::{ContentBlock, EventKind, EventMessage, EventRecord, MessageContent};
pub use ids::TaskId;
pub use status::{ExitStatus, PollOutcome, Summary, TaskReport};
