//! The external executors: rerender, version update and lint.
//!
//! The dispatcher only ever talks to the [`FeedstockTools`] trait. The
//! production implementation, [`CommandTools`], runs one external command per
//! executor inside the cloned feedstock; tests use scripted implementations.
//!
//! Every executor may fail. The dispatcher decides what a failure means: for
//! rerender and version update it becomes an errored [`ExecutionOutcome`], for
//! lint it becomes the "failed to even lint" message.

pub mod command;

use std::future::Future;
use std::path::Path;

use thiserror::Error;

use crate::types::{ExecutionOutcome, LintOutcome, RepoId};

pub use command::{CommandTools, ToolCommand};

/// Errors from running an executor.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The configured command line has no program.
    #[error("no command configured for {tool}")]
    NotConfigured { tool: &'static str },

    /// The process could not be started.
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The process ran longer than allowed and was killed.
    #[error("{tool} did not finish within {secs}s")]
    TimedOut { tool: &'static str, secs: u64 },

    /// The process exited unsuccessfully.
    #[error("{tool} exited with status {code:?}: {stderr}")]
    Failed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    /// The process succeeded but its report could not be read.
    #[error("{tool} printed an unreadable report: {details}")]
    BadReport { tool: &'static str, details: String },
}

/// Result of the version-update executor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionUpdate {
    pub outcome: ExecutionOutcome,
    /// The version the tool settled on, when it got that far.
    pub found_version: Option<String>,
}

/// The three executors the dispatcher can run against a cloned feedstock.
///
/// `feedstock` is the root of the working copy. Executors commit their own
/// changes; the dispatcher only pushes.
pub trait FeedstockTools {
    /// Regenerate the feedstock's build configuration.
    ///
    /// `can_change_workflows` tells the tool whether files under
    /// `.github/workflows` may be touched.
    fn rerender(
        &self,
        feedstock: &Path,
        can_change_workflows: bool,
    ) -> impl Future<Output = Result<ExecutionOutcome, ToolError>> + Send;

    /// Bump the recipe to `input_version`, or to the latest upstream version
    /// when `input_version` is `None`.
    fn update_version(
        &self,
        feedstock: &Path,
        repo: &RepoId,
        input_version: Option<&str>,
    ) -> impl Future<Output = Result<VersionUpdate, ToolError>> + Send;

    /// Lint every recipe in the feedstock.
    fn lint(&self, feedstock: &Path) -> impl Future<Output = Result<LintOutcome, ToolError>> + Send;
}
