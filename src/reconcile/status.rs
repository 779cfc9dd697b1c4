//! Commit status reconciliation for the linter context.
//!
//! GitHub lists a commit's statuses newest first, so the current linter status
//! is the first entry with the linter context. A new status is only created
//! when `(state, target_url)` differs from it; descriptions are derived from
//! the state and never compared.

use crate::effects::requests::{create_status, list_statuses};
use crate::effects::{GitHubInterpreter, StatusData, StatusState};
use crate::github::GitHubApiError;
use crate::types::{LintState, Sha};

/// The status context the linter reports under.
pub const LINTER_CONTEXT: &str = "conda-forge-linter";

/// What the linter wants the commit status to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinterStatus {
    /// Linting has started.
    Pending,
    /// Linting finished with this result.
    Finished(LintState),
}

impl LinterStatus {
    pub fn state(&self) -> StatusState {
        match self {
            LinterStatus::Pending => StatusState::Pending,
            LinterStatus::Finished(LintState::Good | LintState::Mixed) => StatusState::Success,
            LinterStatus::Finished(_) => StatusState::Failure,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LinterStatus::Pending => "Linting in progress...",
            LinterStatus::Finished(LintState::Good) => "All recipes are excellent.",
            LinterStatus::Finished(LintState::Mixed) => "Some recipes have hints.",
            LinterStatus::Finished(_) => "Some recipes need some changes.",
        }
    }

    /// The full status to create.
    pub fn to_status(&self, target_url: Option<String>) -> StatusData {
        StatusData {
            context: LINTER_CONTEXT.to_string(),
            state: self.state(),
            description: self.description().to_string(),
            target_url,
        }
    }
}

/// The current status for `context` in a newest-first list.
pub fn current_status<'a>(statuses: &'a [StatusData], context: &str) -> Option<&'a StatusData> {
    statuses.iter().find(|s| s.context == context)
}

/// Returns true unless `current` already says what `desired` says.
pub fn needs_update(current: Option<&StatusData>, desired: &StatusData) -> bool {
    match current {
        None => true,
        Some(current) => {
            current.state != desired.state || current.target_url != desired.target_url
        }
    }
}

/// Makes the linter status on `sha` reflect `status`.
///
/// Returns true if a new status was created.
#[tracing::instrument(skip(github), fields(sha = %sha.short()))]
pub async fn reconcile_status<G>(
    github: &G,
    sha: &Sha,
    status: LinterStatus,
    target_url: Option<String>,
) -> Result<bool, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    let desired = status.to_status(target_url);
    let statuses = list_statuses(github, sha).await?;

    if !needs_update(current_status(&statuses, LINTER_CONTEXT), &desired) {
        tracing::info!(state = desired.state.as_api_str(), "linter status already current");
        return Ok(false);
    }

    tracing::info!(
        state = desired.state.as_api_str(),
        description = %desired.description,
        "setting linter status"
    );
    create_status(github, sha, desired).await?;
    Ok(true)
}
