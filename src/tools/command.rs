//! Executors run as external commands.
//!
//! Each command runs with the feedstock as its working directory and reports
//! its result as a single JSON object on the last non-empty line of stdout.
//! Anything printed before that line is treated as log output. A non-zero
//! exit status is a failure even if a report was printed.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::process::Command;

use crate::types::{ExecutionOutcome, LintOutcome, RepoId};

use super::{FeedstockTools, ToolError, VersionUpdate};

/// Default limit on how long a single executor may run.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A program plus leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a command line on whitespace. No quoting is supported.
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace().map(str::to_string);
        Self {
            program: words.next().unwrap_or_default(),
            args: words.collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RerenderReport {
    changed: bool,
    error: bool,
    #[serde(default)]
    info_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionReport {
    changed: bool,
    error: bool,
    #[serde(default)]
    found_version: Option<String>,
}

/// `FeedstockTools` backed by three external commands.
#[derive(Debug, Clone)]
pub struct CommandTools {
    rerender: ToolCommand,
    update_version: ToolCommand,
    lint: ToolCommand,
    timeout: Duration,
}

impl CommandTools {
    pub fn new(rerender: ToolCommand, update_version: ToolCommand, lint: ToolCommand) -> Self {
        Self {
            rerender,
            update_version,
            lint,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FeedstockTools for CommandTools {
    async fn rerender(
        &self,
        feedstock: &Path,
        can_change_workflows: bool,
    ) -> Result<ExecutionOutcome, ToolError> {
        let env = [(
            "CF_CAN_CHANGE_WORKFLOWS",
            can_change_workflows.to_string(),
        )];
        let stdout = run_tool("rerender", &self.rerender, feedstock, &[], &env, self.timeout).await?;
        let report: RerenderReport = parse_report("rerender", &stdout)?;

        Ok(ExecutionOutcome {
            changed: report.changed,
            error: report.error,
            info_message: report.info_message.filter(|m| !m.trim().is_empty()),
        })
    }

    async fn update_version(
        &self,
        feedstock: &Path,
        repo: &RepoId,
        input_version: Option<&str>,
    ) -> Result<VersionUpdate, ToolError> {
        let mut args = vec![
            "--feedstock-dir".to_string(),
            feedstock.to_string_lossy().into_owned(),
            "--repo-name".to_string(),
            repo.to_string(),
            "--feedstock-name".to_string(),
            repo.feedstock_name().to_string(),
        ];
        if let Some(version) = input_version {
            args.push("--input-version".to_string());
            args.push(version.to_string());
        }

        let stdout = run_tool(
            "update-version",
            &self.update_version,
            feedstock,
            &args,
            &[],
            self.timeout,
        )
        .await?;
        let report: VersionReport = parse_report("update-version", &stdout)?;

        Ok(VersionUpdate {
            outcome: ExecutionOutcome {
                changed: report.changed,
                error: report.error,
                info_message: None,
            },
            found_version: report.found_version.filter(|v| !v.trim().is_empty()),
        })
    }

    async fn lint(&self, feedstock: &Path) -> Result<LintOutcome, ToolError> {
        let stdout = run_tool("lint", &self.lint, feedstock, &[], &[], self.timeout).await?;
        parse_report("lint", &stdout)
    }
}

/// Runs `command` in `dir` and returns its stdout.
async fn run_tool(
    tool: &'static str,
    command: &ToolCommand,
    dir: &Path,
    extra_args: &[String],
    env: &[(&str, String)],
    timeout: Duration,
) -> Result<String, ToolError> {
    if command.program.is_empty() {
        return Err(ToolError::NotConfigured { tool });
    }

    tracing::info!(tool, program = %command.program, dir = %dir.display(), "running executor");

    let child = Command::new(&command.program)
        .args(&command.args)
        .args(extra_args)
        .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Spawn { tool, source })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| ToolError::TimedOut {
            tool,
            secs: timeout.as_secs(),
        })?
        .map_err(|source| ToolError::Spawn { tool, source })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stderr.is_empty() {
        tracing::debug!(tool, %stderr, "executor stderr");
    }

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool,
            code: output.status.code(),
            stderr: tail(&stderr, 20),
        });
    }

    Ok(stdout)
}

/// Deserializes the last non-empty line of `stdout`.
fn parse_report<T: DeserializeOwned>(tool: &'static str, stdout: &str) -> Result<T, ToolError> {
    let line = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| ToolError::BadReport {
            tool,
            details: "no output".to_string(),
        })?;

    serde_json::from_str(line).map_err(|e| ToolError::BadReport {
        tool,
        details: e.to_string(),
    })
}

/// The last `lines` lines of `text`.
fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
