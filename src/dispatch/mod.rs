//! Event dispatch: one parsed event in, one flow run, one exit status out.
//!
//! ```text
//!            event ──► fetch PR ──► closed? ──► fatal
//!                                      │
//!                                      ▼
//!                               clone PR head
//!                                      │
//!              ┌───────────────────────┼────────────────────────┐
//!              ▼                       ▼                        ▼
//!          rerender             version update                lint
//!     push + comment        push + comment (+ close)   pending status
//!     ready if bot PR       rerender + comment         lint + gate
//!                           title, ready                comment + status
//! ```
//!
//! Every flow comments before it fails, so a failed invocation still leaves
//! an explanation on the PR.

pub mod context;
pub mod event;
mod lint;
mod publish;
mod rerender;
mod version;


use thiserror::Error;

use crate::effects::requests::get_pr;
use crate::effects::{GitEffect, GitHubInterpreter, GitInterpreter, RemoteUrl};
use crate::gate::GateError;
use crate::git::GitError;
use crate::github::GitHubApiError;
use crate::tools::FeedstockTools;
use crate::types::PrNumber;

pub use context::ExecutionContext;
pub use event::{AutomationEvent, EventKind, ParseError, parse_event};
pub use version::version_title;

/// Errors that make an invocation fail.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Closed PRs are never worked on.
    #[error("PR {pr} is closed; refusing to {kind} it")]
    ClosedPullRequest { pr: PrNumber, kind: EventKind },

    #[error("GitHub API error: {0}")]
    GitHub(#[from] GitHubApiError),

    #[error("git error: {0}")]
    Git(#[from] GitError),

    #[error(transparent)]
    Gate(#[from] GateError),

    /// The executor or the push failed. The PR has been told why.
    #[error("{action} failed (push failed: {push_failed}, executor failed: {tool_failed})")]
    ActionFailed {
        action: &'static str,
        push_failed: bool,
        tool_failed: bool,
    },
}

/// Runs the flow `event` asks for.
#[tracing::instrument(skip_all, fields(kind = %event.kind, pr = %event.pr, repo = %event.repository))]
pub async fn dispatch<G, R, T>(
    ctx: &ExecutionContext<G, R, T>,
    event: &AutomationEvent,
) -> Result<(), DispatchError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
    R: GitInterpreter<Error = GitError>,
    T: FeedstockTools,
{
    let pr = get_pr(&ctx.github, event.pr).await?;
    if !pr.state.is_open() {
        return Err(DispatchError::ClosedPullRequest {
            pr: event.pr,
            kind: event.kind,
        });
    }

    tracing::info!(
        head = %pr.head.repo_id(),
        branch = %pr.head.branch,
        fork = pr.head.is_fork,
        "cloning PR head"
    );
    ctx.git
        .interpret(GitEffect::Clone {
            url: RemoteUrl::new(pr.head.clone_url()),
            branch: pr.head.branch.clone(),
        })
        .await?;

    match event.kind {
        EventKind::Rerender => rerender::handle_rerender(ctx, &pr).await,
        EventKind::VersionUpdate => {
            version::handle_version_update(
                ctx,
                &event.repository,
                &pr,
                event.input_version.as_deref(),
            )
            .await
        }
        EventKind::Lint => lint::handle_lint(ctx, &pr).await,
    }
}
