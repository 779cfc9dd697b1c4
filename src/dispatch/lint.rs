//! Lint flow.

use crate::effects::{GitHubInterpreter, GitInterpreter, PrData};
use crate::gate::wait_for_mergeable;
use crate::git::GitError;
use crate::github::GitHubApiError;
use crate::messages::{render_lint, render_lint_failure};
use crate::reconcile::{LinterStatus, reconcile_comment, reconcile_status};
use crate::tools::FeedstockTools;
use crate::types::LintState;

use super::{DispatchError, ExecutionContext};

/// Lints the cloned PR head and reports the result as a comment plus a
/// commit status pointing at it.
///
/// A linter failure is reported as `bad`; it does not fail the invocation.
#[tracing::instrument(skip_all, fields(pr = %pr.number, sha = %pr.head.head_sha.short()))]
pub(crate) async fn handle_lint<G, R, T>(
    ctx: &ExecutionContext<G, R, T>,
    pr: &PrData,
) -> Result<(), DispatchError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
    R: GitInterpreter<Error = GitError>,
    T: FeedstockTools,
{
    let sha = &pr.head.head_sha;
    reconcile_status(&ctx.github, sha, LinterStatus::Pending, None).await?;

    let (notification, state) = match ctx.tools.lint(ctx.git.worktree()).await {
        Ok(outcome) => {
            let mergeable = wait_for_mergeable(&ctx.github, pr.number, &ctx.settings.poll).await?;
            let state = outcome.classify(mergeable);
            (render_lint(&outcome, state, &ctx.run_link), state)
        }
        Err(e) => {
            tracing::warn!(error = %e, "linter failed");
            (render_lint_failure(&ctx.run_link), LintState::Bad)
        }
    };
    tracing::info!(%state, "lint classified");

    let reconciled = reconcile_comment(&ctx.github, pr.number, &notification).await?;
    reconcile_status(
        &ctx.github,
        sha,
        LinterStatus::Finished(state),
        Some(reconciled.comment.html_url),
    )
    .await?;

    Ok(())
}
