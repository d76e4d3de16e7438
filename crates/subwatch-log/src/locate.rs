//! Discovery of the directory holding a batch's task logs.
//!
//! Logs live at `<root>/<session>/tasks/<taskId>.output`, where `root` is one
//! of a few well-known temp directories and `session` is chosen by the
//! dispatcher. When the session is not passed in, it is found by scanning the
//! roots' immediate subdirectories.

use std::path::{Path, PathBuf};
use std::time::Duration;

use subwatch_core::TaskId;
use tokio::time::Instant;
use tracing::{debug, info};

/// Name of the per-session folder holding task logs.
pub const TASKS_DIR: &str = "tasks";

/// Default time to wait for the dispatcher to create the session directory.
pub const DEFAULT_DISCOVERY_WINDOW: Duration = Duration::from_secs(30);

/// Default delay between discovery scans.
pub const DEFAULT_DISCOVERY_INTERVAL: Duration = Duration::from_secs(1);

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Immediate subdirectories of `root`, sorted by name. A missing or
/// unreadable root yields nothing.
async fn session_dirs(root: &Path) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(root = %root.display(), error = %e, "Skipping candidate root");
            return Vec::new();
        }
    };

    let mut dirs = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let is_dir = entry
                    .file_type()
                    .await
                    .map(|t| t.is_dir())
                    .unwrap_or(false);
                if is_dir {
                    dirs.push(entry.path());
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "Stopped reading candidate root");
                break;
            }
        }
    }
    dirs.sort();
    dirs
}

/// Session directories to consider, in search order.
///
/// With a scope, only `<root>/<scope>` of each root is considered; otherwise
/// every immediate subdirectory of every root.
async fn candidate_sessions(roots: &[PathBuf], scope: Option<&str>) -> Vec<PathBuf> {
    match scope {
        Some(scope) => roots.iter().map(|root| root.join(scope)).collect(),
        None => {
            let mut sessions = Vec::new();
            for root in roots {
                sessions.extend(session_dirs(root).await);
            }
            sessions
        }
    }
}

/// Single discovery pass: the first `tasks` directory holding a log for any
/// of `ids`.
pub async fn scan_once(roots: &[PathBuf], scope: Option<&str>, ids: &[TaskId]) -> Option<PathBuf> {
    for session in candidate_sessions(roots, scope).await {
        let tasks_dir = session.join(TASKS_DIR);
        for id in ids {
            if is_file(&tasks_dir.join(id.log_file_name())).await {
                return Some(tasks_dir);
            }
        }
    }
    None
}

/// Retry [`scan_once`] every `interval` until a directory is found or
/// `window` has elapsed. Returns `None` once the window is exhausted.
pub async fn wait_for_task_dir(
    roots: &[PathBuf],
    scope: Option<&str>,
    ids: &[TaskId],
    window: Duration,
    interval: Duration,
) -> Option<PathBuf> {
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if let Some(dir) = scan_once(roots, scope, ids).await {
            info!(dir = %dir.display(), attempts, "Resolved task directory");
            return Some(dir);
        }
        if started.elapsed() >= window {
            debug!(attempts, "Task directory discovery window elapsed");
            return None;
        }
        tokio::time::sleep(interval).await;
    }
}

/// One-shot lookup of a single task's log file.
///
/// With a scope hint, `<root>/<scope>/tasks/<id>.output` is tried under each
/// root first; then every session of every root is scanned.
pub async fn find_task_log(roots: &[PathBuf], id: &TaskId, scope: Option<&str>) -> Option<PathBuf> {
    let file_name = id.log_file_name();

    if scope.is_some() {
        for session in candidate_sessions(roots, scope).await {
            let path = session.join(TASKS_DIR).join(&file_name);
            if is_file(&path).await {
                return Some(path);
            }
        }
        debug!(task_id = %id, "Not found under scope, scanning all sessions");
    }

    for session in candidate_sessions(roots, None).await {
        let path = session.join(TASKS_DIR).join(&file_name);
        if is_file(&path).await {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch_log(root: &Path, session: &str, id: &str) -> PathBuf {
        let dir = root.join(session).join(TASKS_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{id}.output"));
        std::fs::write(&path, "").unwrap();
        path
    }

    #[tokio::test]
    async fn test_scan_finds_session_with_any_id() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        std::fs::create_dir_all(root.join("empty-session")).unwrap();
        touch_log(&root, "other", "unrelated");
        touch_log(&root, "proj", "t2");

        let ids = vec![TaskId::new("t1"), TaskId::new("t2")];
        let found = scan_once(&[root.clone()], None, &ids).await;
        assert_eq!(found, Some(root.join("proj").join(TASKS_DIR)));
    }

    #[tokio::test]
    async fn test_scan_respects_root_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch_log(second.path(), "b", "t1");
        touch_log(first.path(), "z", "t1");

        let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let found = scan_once(&roots, None, &[TaskId::new("t1")]).await;
        assert_eq!(found, Some(first.path().join("z").join(TASKS_DIR)));
    }

    #[tokio::test]
    async fn test_scan_with_scope() {
        let temp_dir = TempDir::new().unwrap();
        touch_log(temp_dir.path(), "a", "t1");
        touch_log(temp_dir.path(), "b", "t1");

        let roots = vec![temp_dir.path().to_path_buf()];
        let found = scan_once(&roots, Some("b"), &[TaskId::new("t1")]).await;
        assert_eq!(found, Some(temp_dir.path().join("b").join(TASKS_DIR)));
    }

    #[tokio::test]
    async fn test_missing_root_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        touch_log(temp_dir.path(), "s", "t1");

        let roots = vec![
            temp_dir.path().join("does-not-exist"),
            temp_dir.path().to_path_buf(),
        ];
        assert!(scan_once(&roots, None, &[TaskId::new("t1")]).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_gives_up_after_window() {
        let temp_dir = TempDir::new().unwrap();
        let roots = vec![temp_dir.path().to_path_buf()];

        let started = Instant::now();
        let found = wait_for_task_dir(
            &roots,
            None,
            &[TaskId::new("t1")],
            DEFAULT_DISCOVERY_WINDOW,
            DEFAULT_DISCOVERY_INTERVAL,
        )
        .await;

        assert_eq!(found, None);
        assert!(started.elapsed() >= DEFAULT_DISCOVERY_WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_picks_up_late_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let roots = vec![root.clone()];

        let writer_root = root.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            touch_log(&writer_root, "late", "t1");
        });

        let dir = wait_for_task_dir(
            &roots,
            None,
            &[TaskId::new("t1")],
            DEFAULT_DISCOVERY_WINDOW,
            DEFAULT_DISCOVERY_INTERVAL,
        )
        .await;
        assert_eq!(dir, Some(root.join("late").join(TASKS_DIR)));
    }

    #[tokio::test]
    async fn test_find_task_log_prefers_scope() {
        let temp_dir = TempDir::new().unwrap();
        touch_log(temp_dir.path(), "a", "t1");
        let scoped = touch_log(temp_dir.path(), "b", "t1");

        let roots = vec![temp_dir.path().to_path_buf()];
        let found = find_task_log(&roots, &TaskId::new("t1"), Some("b")).await;
        assert_eq!(found, Some(scoped));
    }

    #[tokio::test]
    async fn test_find_task_log_falls_back_to_scan() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch_log(temp_dir.path(), "a", "t1");

        let roots = vec![temp_dir.path().to_path_buf()];
        let found = find_task_log(&roots, &TaskId::new("t1"), Some("wrong")).await;
        assert_eq!(found, Some(path));
        assert!(find_task_log(&roots, &TaskId::new("t9"), None).await.is_none());
    }
}
