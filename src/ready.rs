//! Draft to ready-for-review transition.

use crate::effects::requests::get_pr;
use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::GitHubApiError;
use crate::types::PrNumber;

/// Marks `pr` ready for review if it is a draft.
///
/// Returns true if the PR is (now) ready. A PR that already is counts as
/// success without any mutation. Every failure is logged and reported as
/// `false`; none of them is fatal.
#[tracing::instrument(skip(github), fields(pr = %pr))]
pub async fn mark_ready_for_review<G>(github: &G, pr: PrNumber) -> bool
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    let data = match get_pr(github, pr).await {
        Ok(data) => data,
        Err(e) => {
            tracing::error!(error = %e, "could not read PR before marking it ready");
            return false;
        }
    };

    if !data.is_draft {
        tracing::debug!("PR is not a draft");
        return true;
    }

    match github
        .interpret(GitHubEffect::MarkReadyForReview {
            node_id: data.node_id,
        })
        .await
    {
        Ok(GitHubResponse::MarkedReady) => {
            tracing::info!("marked PR ready for review");
            true
        }
        Ok(GitHubResponse::MutationRejected { errors }) => {
            tracing::error!(?errors, "ready-for-review mutation rejected");
            false
        }
        Ok(other) => {
            tracing::error!(response = other.kind(), "unexpected response to ready-for-review");
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "ready-for-review mutation failed");
            false
        }
    }
}
