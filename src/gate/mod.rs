//! Mergeability gate.
//!
//! Blocks until GitHub has an answer to "can this PR be merged", the PR stops
//! being open, or the wait times out. A timeout is a distinct error: the
//! caller must not mistake "GitHub never answered" for "not mergeable".

pub mod poll;

use thiserror::Error;
use tokio::time::Instant;

use crate::effects::GitHubInterpreter;
use crate::effects::requests::get_pr;
use crate::github::GitHubApiError;
use crate::types::PrNumber;

pub use poll::PollConfig;

/// Errors from waiting on mergeability.
#[derive(Debug, Error)]
pub enum GateError {
    /// GitHub kept reporting `mergeable: null` for the whole wait.
    #[error("mergeability of PR {pr} still unknown after {waited_secs}s")]
    Timeout { pr: PrNumber, waited_secs: u64 },

    /// Fetching the PR failed.
    #[error(transparent)]
    GitHub(#[from] GitHubApiError),
}

/// Waits for GitHub to decide whether `pr` is mergeable.
///
/// Every fetch is preceded by a `recheck_interval` sleep, so even the first
/// answer is at least that fresh. Returns `Ok(false)` as soon as the PR is seen
/// closed, whatever its mergeability.
#[tracing::instrument(skip(github, config), fields(pr = %pr))]
pub async fn wait_for_mergeable<G>(
    github: &G,
    pr: PrNumber,
    config: &PollConfig,
) -> Result<bool, GateError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        tokio::time::sleep(config.recheck_interval).await;
        attempts += 1;

        let data = get_pr(github, pr).await?;
        if !data.state.is_open() {
            tracing::info!(attempts, "PR is no longer open; treating as not mergeable");
            return Ok(false);
        }

        if let Some(mergeable) = data.mergeable {
            tracing::debug!(attempts, mergeable, "mergeability known");
            return Ok(mergeable);
        }

        let waited = started.elapsed();
        if waited >= config.wait_timeout {
            tracing::warn!(attempts, ?waited, "gave up waiting for mergeability");
            return Err(GateError::Timeout {
                pr,
                waited_secs: waited.as_secs(),
            });
        }
    }
}
