//! Effect interpreter traits.
//!
//! These traits define how effects are executed:
//! - `crate::github::OctocrabClient` interprets GitHub effects against the API
//! - `crate::git::LocalGit` interprets git effects against a working copy
//!
//! The reconcilers and the dispatcher are generic over these traits, which is
//! what lets tests run whole flows against an in-memory platform.

use std::future::Future;
use std::path::Path;

use super::git::{GitEffect, GitResponse};
use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct MockGitHubInterpreter {
///     responses: HashMap<GitHubEffect, GitHubResponse>,
/// }
///
/// impl GitHubInterpreter for MockGitHubInterpreter {
///     type Error = GitHubApiError;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         self.responses.get(&effect)
///             .cloned()
///             .ok_or_else(|| GitHubApiError::permanent_without_source("unexpected effect"))
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}

/// Interprets Git effects against a local working copy.
///
/// Implementations are constructed with the working copy path, so all effects
/// executed through a single interpreter instance operate on that path.
pub trait GitInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// The working copy this interpreter operates on.
    fn worktree(&self) -> &Path;

    /// Execute a Git effect and return its response.
    fn interpret(
        &self,
        effect: GitEffect,
    ) -> impl Future<Output = Result<GitResponse, Self::Error>> + Send;
}
