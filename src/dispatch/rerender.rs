//! Rerender flow.

use crate::effects::{GitHubInterpreter, GitInterpreter, PrData};
use crate::git::GitError;
use crate::github::GitHubApiError;
use crate::messages::Action;
use crate::ready::mark_ready_for_review;
use crate::tools::FeedstockTools;
use crate::types::ExecutionOutcome;

use super::publish::publish;
use super::{DispatchError, ExecutionContext};

/// Rerenders the cloned PR head and reports the result.
///
/// A PR the bot opened to request a rerender is marked ready for review once
/// the rerender is pushed.
#[tracing::instrument(skip_all, fields(pr = %pr.number))]
pub(crate) async fn handle_rerender<G, R, T>(
    ctx: &ExecutionContext<G, R, T>,
    pr: &PrData,
) -> Result<(), DispatchError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
    R: GitInterpreter<Error = GitError>,
    T: FeedstockTools,
{
    rerender_and_publish(ctx, pr).await?;

    if ctx.settings.is_bot_rerender_pr(&pr.title, &pr.author) {
        mark_ready_for_review(&ctx.github, pr.number).await;
    }
    Ok(())
}

/// Runs the rerender executor, then pushes and comments.
///
/// Fails after commenting if the executor failed or the push was rejected.
pub(crate) async fn rerender_and_publish<G, R, T>(
    ctx: &ExecutionContext<G, R, T>,
    pr: &PrData,
) -> Result<(), DispatchError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
    R: GitInterpreter<Error = GitError>,
    T: FeedstockTools,
{
    let can_change_workflows = ctx.credentials.can_change_workflows;
    tracing::info!(can_change_workflows, "rerendering");

    let outcome = match ctx
        .tools
        .rerender(ctx.git.worktree(), can_change_workflows)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "rerender executor failed");
            ExecutionOutcome::failed()
        }
    };

    let push_failed = publish(ctx, pr, Action::Rerender, &outcome, false).await?;
    if outcome.error || push_failed {
        return Err(DispatchError::ActionFailed {
            action: Action::Rerender.verb(),
            push_failed,
            tool_failed: outcome.error,
        });
    }
    Ok(())
}
