//! Version-update flow.

use crate::effects::requests::edit_pr_title;
use crate::effects::{GitHubInterpreter, GitInterpreter, PrData};
use crate::git::GitError;
use crate::github::GitHubApiError;
use crate::messages::Action;
use crate::ready::mark_ready_for_review;
use crate::tools::{FeedstockTools, VersionUpdate};
use crate::types::{ExecutionOutcome, RepoId};

use super::publish::publish;
use super::rerender::rerender_and_publish;
use super::{DispatchError, ExecutionContext};

/// Title given to a PR once the version it updates to is known.
pub fn version_title(version: &str) -> String {
    format!("ENH: update package version to {}", version)
}

/// Updates the recipe version, then rerenders if anything changed.
///
/// With nothing to update the PR is closed after commenting. After a
/// successful update the title names the new version and the PR is marked
/// ready for review.
#[tracing::instrument(skip_all, fields(pr = %pr.number, input_version = ?input_version))]
pub(crate) async fn handle_version_update<G, R, T>(
    ctx: &ExecutionContext<G, R, T>,
    repository: &RepoId,
    pr: &PrData,
    input_version: Option<&str>,
) -> Result<(), DispatchError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
    R: GitInterpreter<Error = GitError>,
    T: FeedstockTools,
{
    let update = match ctx
        .tools
        .update_version(ctx.git.worktree(), repository, input_version)
        .await
    {
        Ok(update) => update,
        Err(e) => {
            tracing::error!(error = %e, "version executor failed");
            VersionUpdate {
                outcome: ExecutionOutcome::failed(),
                found_version: None,
            }
        }
    };

    let push_failed = publish(ctx, pr, Action::UpdateVersion, &update.outcome, true).await?;
    if update.outcome.error || push_failed {
        return Err(DispatchError::ActionFailed {
            action: Action::UpdateVersion.verb(),
            push_failed,
            tool_failed: update.outcome.error,
        });
    }

    if !update.outcome.changed {
        return Ok(());
    }

    rerender_and_publish(ctx, pr).await?;

    if let Some(version) = update.found_version.as_deref() {
        let title = version_title(version);
        tracing::info!(%title, "updating PR title");
        if let Err(e) = edit_pr_title(&ctx.github, pr.number, title).await {
            tracing::warn!(error = %e, "could not update PR title");
        }
    }

    mark_ready_for_review(&ctx.github, pr.number).await;
    Ok(())
}
