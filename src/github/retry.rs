//! Backoff for transient GitHub failures.
//!
//! Retrying happens per request, inside the interpreter, and only for requests
//! that can be sent twice without leaving a trace. Nothing above the
//! interpreter retries: a failed push or a failed tool run is never repeated.

use std::future::Future;
use std::time::Duration;

use crate::effects::GitHubEffect;

use super::error::GitHubApiError;

/// How long to wait between attempts. Delays double from `initial_delay` up
/// to `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts after the first.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Three retries, after 2s, 4s and 8s.
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(16),
    };

    /// Delay before retry number `retry` (0-indexed).
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        self.initial_delay
            .checked_mul(1u32.checked_shl(retry).unwrap_or(u32::MAX))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether a request may be sent again after a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    RetryTransient,
    /// The first failure is final.
    NoRetry,
}

impl RetryPolicy {
    /// Reads and edits are safe to repeat. Creating a comment or a status is
    /// not: a 502 after GitHub stored the first one would store a second.
    pub fn for_effect(effect: &GitHubEffect) -> Self {
        match effect {
            GitHubEffect::PostComment { .. } | GitHubEffect::CreateStatus { .. } => {
                RetryPolicy::NoRetry
            }
            _ => RetryPolicy::RetryTransient,
        }
    }
}

/// Runs `operation`, repeating it on transient errors as `policy` and
/// `config` allow. Permanent errors are returned at once.
pub async fn retry_with_backoff<T, F, Fut>(
    config: RetryConfig,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, GitHubApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubApiError>>,
{
    let retries = match policy {
        RetryPolicy::RetryTransient => config.max_retries,
        RetryPolicy::NoRetry => 0,
    };
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.kind.is_retriable() => return Err(e),
            Err(e) if retry >= retries => {
                tracing::warn!(attempts = retry + 1, error = %e, "giving up on GitHub request");
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for_attempt(retry);
                tracing::debug!(retry, ?delay, error = %e, "retrying GitHub request");
                tokio::time::sleep(delay).await;
                retry += 1;
            }
        }
    }
}
