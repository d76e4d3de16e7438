//! Supervisor configuration.

use std::path::PathBuf;
use std::time::Duration;

use subwatch_log::{DEFAULT_DISCOVERY_INTERVAL, DEFAULT_DISCOVERY_WINDOW};

/// Directory name, under a temp base, where the dispatcher keeps sessions.
const SESSIONS_DIR: &str = "claude";

/// Well-known roots that may hold session directories, in search order.
///
/// `$TMPDIR/claude` first, then the conventional Unix and macOS locations.
pub fn default_roots() -> Vec<PathBuf> {
    let candidates = [
        std::env::temp_dir().join(SESSIONS_DIR),
        PathBuf::from("/tmp").join(SESSIONS_DIR),
        PathBuf::from("/private/tmp").join(SESSIONS_DIR),
    ];

    let mut roots: Vec<PathBuf> = Vec::new();
    for root in candidates {
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

/// Supervisor and inspector configuration.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Candidate roots scanned for session directories.
    pub roots: Vec<PathBuf>,

    /// Explicit task directory; skips discovery entirely when set.
    pub task_dir: Option<PathBuf>,

    /// Session/scope name under each root; narrows discovery when set.
    pub scope: Option<String>,

    /// Delay between polls of pending tasks.
    pub tick_interval: Duration,

    /// How long to wait for the task directory to appear.
    pub discovery_window: Duration,

    /// Delay between discovery scans.
    pub discovery_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            task_dir: None,
            scope: None,
            tick_interval: Duration::from_secs(1),
            discovery_window: DEFAULT_DISCOVERY_WINDOW,
            discovery_interval: DEFAULT_DISCOVERY_INTERVAL,
        }
    }
}

impl SupervisorConfig {
    /// Replace the candidate roots.
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots;
        self
    }

    /// Use an already resolved task directory.
    pub fn with_task_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.task_dir = Some(dir.into());
        self
    }

    /// Restrict discovery to one session name.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}
