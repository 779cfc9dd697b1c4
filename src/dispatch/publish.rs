//! Pushing an executor's changes and reporting the result on the PR.

use crate::effects::requests::set_pr_state;
use crate::effects::{GitEffect, GitHubInterpreter, GitInterpreter, GitResponse, PrData, RemoteUrl};
use crate::git::{GitError, PushResult};
use crate::github::GitHubApiError;
use crate::messages::{Action, Report, render_report};
use crate::reconcile::reconcile_comment;
use crate::tools::FeedstockTools;
use crate::types::{ExecutionOutcome, PrState, PullRequestRef};

use super::{DispatchError, ExecutionContext};

/// Pushes `outcome`'s changes if there are any, then comments and closes as
/// the outcome requires.
///
/// Returns true if the push was attempted and failed. The PR is closed only
/// when `close_if_unchanged` is set and the executor neither changed
/// anything nor failed.
pub(crate) async fn publish<G, R, T>(
    ctx: &ExecutionContext<G, R, T>,
    pr: &PrData,
    action: Action,
    outcome: &ExecutionOutcome,
    close_if_unchanged: bool,
) -> Result<bool, DispatchError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
    R: GitInterpreter<Error = GitError>,
    T: FeedstockTools,
{
    let closing = close_if_unchanged && !outcome.changed && !outcome.error;

    let report = if outcome.should_push() {
        if push_changes(ctx, &pr.head).await {
            Report::Pushed
        } else {
            Report::PushFailed {
                head: pr.head.clone(),
            }
        }
    } else if outcome.error {
        Report::ToolError
    } else {
        Report::NothingToDo { closing }
    };
    let push_failed = matches!(report, Report::PushFailed { .. });

    tracing::info!(
        action = action.verb(),
        changed = outcome.changed,
        error = outcome.error,
        push_failed,
        "executor finished"
    );

    if let Some(notification) = render_report(
        action,
        &report,
        outcome.info_message.as_deref(),
        &ctx.run_link,
    ) {
        reconcile_comment(&ctx.github, pr.number, &notification).await?;
    }

    if closing {
        tracing::info!(pr = %pr.number, "nothing changed; closing PR");
        set_pr_state(&ctx.github, pr.number, PrState::Closed).await?;
    }

    Ok(push_failed)
}

/// Pushes the working copy's branch with credentials, restoring the
/// unauthenticated push URL afterwards whatever happened.
///
/// Returns true if the remote accepted the push.
async fn push_changes<G, R, T>(ctx: &ExecutionContext<G, R, T>, head: &PullRequestRef) -> bool
where
    R: GitInterpreter<Error = GitError>,
{
    let authenticated = RemoteUrl::new(
        head.authenticated_url(&ctx.credentials.actor, ctx.credentials.token()),
    );
    let plain = RemoteUrl::new(head.clone_url());

    let pushed = match ctx
        .git
        .interpret(GitEffect::SetPushUrl { url: authenticated })
        .await
    {
        Ok(_) => push_branch(ctx, head).await,
        Err(e) => {
            tracing::error!(error = %e, "could not configure push URL");
            false
        }
    };

    if let Err(e) = ctx.git.interpret(GitEffect::SetPushUrl { url: plain }).await {
        tracing::error!(error = %e, "could not restore push URL");
    }

    pushed
}

async fn push_branch<G, R, T>(ctx: &ExecutionContext<G, R, T>, head: &PullRequestRef) -> bool
where
    R: GitInterpreter<Error = GitError>,
{
    let result = ctx
        .git
        .interpret(GitEffect::Push {
            branch: head.branch.clone(),
        })
        .await;

    match result {
        Ok(GitResponse::Pushed(PushResult::Success { pushed_sha })) => {
            tracing::info!(branch = %head.branch, sha = %pushed_sha.short(), "pushed");
            true
        }
        Ok(GitResponse::Pushed(PushResult::AlreadyUpToDate)) => {
            tracing::info!(branch = %head.branch, "remote already up to date");
            true
        }
        Ok(GitResponse::Pushed(PushResult::Rejected { details })) => {
            tracing::error!(branch = %head.branch, %details, "push rejected");
            false
        }
        Ok(other) => {
            tracing::error!(response = ?other, "unexpected response to push");
            false
        }
        Err(e) => {
            tracing::error!(branch = %head.branch, error = %e, "push failed");
            false
        }
    }
}
