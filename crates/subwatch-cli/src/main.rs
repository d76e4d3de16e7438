//! subwatch CLI - supervise and inspect subagent task logs.
//!
//! Stdout carries only the line protocol (or the inspection report); all
//! diagnostics go to stderr through `tracing`.

use std::fmt::Display;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use subwatch_core::{ExitStatus, TaskId};
use subwatch_supervisor::{
    InspectOptions, Inspector, Supervisor, SupervisorConfig, DEFAULT_MAX_CHARS,
};

/// subwatch - Subagent task supervisor
#[derive(Parser, Debug)]
#[command(name = "subwatch")]
#[command(about = "Supervise and inspect subagent task logs", long_about = None)]
struct Cli {
    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Root directory holding session directories (repeatable, replaces the defaults)
    #[arg(long = "root", value_name = "DIR", global = true)]
    roots: Vec<PathBuf>,

    /// Task directory to use as is, skipping discovery
    #[arg(long, value_name = "DIR", global = true)]
    task_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wait for tasks to finish and print a summary
    Supervise {
        /// Task IDs (space or comma separated)
        #[arg(required = true, value_delimiter = ',')]
        task_ids: Vec<String>,

        /// Overall timeout in seconds
        #[arg(short, long, default_value = "600")]
        timeout: u64,

        /// Session name to look in instead of scanning every session
        #[arg(long)]
        scope: Option<String>,
    },

    /// Print a detailed report for one task
    Inspect {
        /// Task ID
        task_id: String,

        /// Session name to look in first
        #[arg(short, long)]
        scope: Option<String>,

        /// Maximum characters of final output to show
        #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
        max_chars: usize,

        /// Show the full final output
        #[arg(long)]
        full: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn config(&self) -> SupervisorConfig {
        let mut config = SupervisorConfig::default();
        if !self.roots.is_empty() {
            config = config.with_roots(self.roots.clone());
        }
        if let Some(dir) = &self.task_dir {
            config = config.with_task_dir(dir.clone());
        }
        config
    }
}

/// Stdout text and exit status of one command.
#[derive(Debug)]
struct CommandOutput {
    stdout: String,
    status: ExitStatus,
}

impl CommandOutput {
    fn new(stdout: String, status: ExitStatus) -> Self {
        Self { stdout, status }
    }

    fn error(err: impl Display) -> Self {
        Self::new(format!("ERROR: {}\n", err), ExitStatus::Failure)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,subwatch={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = cli.config();
    debug!(roots = ?config.roots, task_dir = ?config.task_dir, "Resolved configuration");

    let output = match cli.command {
        Commands::Supervise {
            task_ids,
            timeout,
            scope,
        } => {
            if let Some(scope) = scope {
                config = config.with_scope(scope);
            }
            supervise(config, task_ids, timeout).await
        }
        Commands::Inspect {
            task_id,
            scope,
            max_chars,
            full,
            json,
        } => {
            let options = InspectOptions {
                scope,
                max_chars,
                full,
            };
            inspect(config, task_id, options, json).await
        }
    };

    print!("{}", output.stdout);
    ExitCode::from(output.status.code())
}

async fn supervise(
    config: SupervisorConfig,
    task_ids: Vec<String>,
    timeout: u64,
) -> CommandOutput {
    let ids = match TaskId::batch(task_ids) {
        Ok(ids) => ids,
        Err(e) => return CommandOutput::error(e),
    };

    match Supervisor::new(config)
        .supervise(&ids, Duration::from_secs(timeout))
        .await
    {
        Ok(summary) => {
            let stdout: String = summary
                .protocol_lines()
                .into_iter()
                .map(|line| format!("{}\n", line))
                .collect();
            CommandOutput::new(stdout, summary.exit_status())
        }
        Err(e) => CommandOutput::error(e),
    }
}

async fn inspect(
    config: SupervisorConfig,
    task_id: String,
    options: InspectOptions,
    json: bool,
) -> CommandOutput {
    let task_id = match TaskId::parse(task_id) {
        Ok(id) => id,
        Err(e) => return CommandOutput::error(e),
    };

    let report = match Inspector::new(config).inspect(&task_id, &options).await {
        Ok(report) => report,
        Err(e) => return CommandOutput::error(e),
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => CommandOutput::new(format!("{}\n", text), ExitStatus::Success),
            Err(e) => CommandOutput::error(e),
        }
    } else {
        CommandOutput::new(report.render(), ExitStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    const DONE: &str = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"done"}],"stop_reason":"end_turn"}}"#;
    const FAILED: &str = r#"{"type":"user","message":{"content":[{"type":"tool_result","is_error":true,"content":"exit 1"}]}}"#;

    fn write_log(root: &std::path::Path, id: &str, lines: &[&str]) {
        let dir = root.join("session-1").join("tasks");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{id}.output")), lines.join("\n")).unwrap();
    }

    fn config_for(root: &TempDir) -> SupervisorConfig {
        SupervisorConfig::default().with_roots(vec![root.path().to_path_buf()])
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_supervise_args() {
        let cli = Cli::try_parse_from(["subwatch", "supervise", "t1,t2", "t3", "--timeout", "5"])
            .unwrap();
        match cli.command {
            Commands::Supervise {
                task_ids,
                timeout,
                scope,
            } => {
                assert_eq!(task_ids, vec!["t1", "t2", "t3"]);
                assert_eq!(timeout, 5);
                assert!(scope.is_none());
            }
            other => panic!("Expected supervise, got {:?}", other),
        }
    }

    #[test]
    fn test_supervise_requires_ids() {
        assert!(Cli::try_parse_from(["subwatch", "supervise"]).is_err());
    }

    #[test]
    fn test_inspect_defaults() {
        let cli = Cli::try_parse_from(["subwatch", "inspect", "t1"]).unwrap();
        match cli.command {
            Commands::Inspect {
                task_id,
                scope,
                max_chars,
                full,
                json,
            } => {
                assert_eq!(task_id, "t1");
                assert!(scope.is_none());
                assert_eq!(max_chars, 2000);
                assert!(!full);
                assert!(!json);
            }
            other => panic!("Expected inspect, got {:?}", other),
        }
    }

    #[test]
    fn test_global_roots_and_task_dir() {
        let cli = Cli::try_parse_from([
            "subwatch",
            "inspect",
            "t1",
            "--root",
            "/a",
            "--root",
            "/b",
            "--task-dir",
            "/a/s/tasks",
        ])
        .unwrap();
        let config = cli.config();

        assert_eq!(config.roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(config.task_dir, Some(PathBuf::from("/a/s/tasks")));
    }

    #[test]
    fn test_default_roots_kept_without_flag() {
        let cli = Cli::try_parse_from(["subwatch", "supervise", "t1"]).unwrap();
        assert_eq!(cli.config().roots, subwatch_supervisor::default_roots());
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervise_missing_directory_output() {
        let temp_dir = TempDir::new().unwrap();

        let output = supervise(config_for(&temp_dir), vec!["t1".to_string()], 600).await;
        assert_eq!(output.stdout, "ERROR: task dir not found after 30s\n");
        assert_eq!(output.status.code(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervise_done_output() {
        let temp_dir = TempDir::new().unwrap();
        write_log(temp_dir.path(), "t1", &[DONE]);
        write_log(temp_dir.path(), "t2", &[FAILED, DONE]);

        let ids = vec!["t1".to_string(), "t2".to_string()];
        let output = supervise(config_for(&temp_dir), ids, 600).await;
        assert_eq!(output.stdout, "DONE\nOK|t1\nFAIL|t2|1 errors|exit 1\n");
        assert_eq!(output.status.code(), 1);
    }

    #[tokio::test]
    async fn test_supervise_invalid_id_output() {
        let temp_dir = TempDir::new().unwrap();

        let output = supervise(config_for(&temp_dir), vec!["../x".to_string()], 600).await;
        assert!(output.stdout.starts_with("ERROR: "));
        assert_eq!(output.status.code(), 1);
    }

    #[tokio::test]
    async fn test_inspect_missing_log_output() {
        let temp_dir = TempDir::new().unwrap();

        let output = inspect(
            config_for(&temp_dir),
            "ghost".to_string(),
            InspectOptions::default(),
            false,
        )
        .await;
        assert_eq!(output.stdout, "ERROR: no log found for task ghost\n");
        assert_eq!(output.status.code(), 1);
    }

    #[tokio::test]
    async fn test_inspect_success_output() {
        let temp_dir = TempDir::new().unwrap();
        write_log(temp_dir.path(), "t1", &[DONE]);

        let output = inspect(
            config_for(&temp_dir),
            "t1".to_string(),
            InspectOptions::default(),
            false,
        )
        .await;
        assert_eq!(output.status.code(), 0);
        assert!(output.stdout.starts_with("Task:    t1\n"));
        assert!(output.stdout.contains("Final output:\ndone\n"));

        let json = inspect(
            config_for(&temp_dir),
            "t1".to_string(),
            InspectOptions::default(),
            true,
        )
        .await;
        assert_eq!(json.status.code(), 0);
        let value: serde_json::Value = serde_json::from_str(&json.stdout).unwrap();
        assert_eq!(value["task_id"], "t1");
        assert_eq!(value["final_output"], "done");
    }
}
