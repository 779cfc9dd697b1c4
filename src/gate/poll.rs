//! Timing for the mergeability wait.
//!
//! GitHub computes a PR's mergeability in the background after every push to
//! the head or base branch. Until it is done, the REST API reports
//! `mergeable: null`, and the only way to learn the answer is to ask again.
//!
//! - **Recheck interval**: 1 second between fetches
//! - **Timeout**: 5 minutes before giving up (configurable via
//!   `DISPATCH_MERGEABLE_TIMEOUT_SECS`)

use std::time::Duration;

/// Default timeout for waiting on GitHub's mergeability computation (5 minutes).
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 300;

/// Default interval between fetches while mergeability is unknown (1 second).
const DEFAULT_RECHECK_INTERVAL_SECS: u64 = 1;

/// Environment variable overriding the wait timeout, in seconds.
pub const WAIT_TIMEOUT_ENV: &str = "DISPATCH_MERGEABLE_TIMEOUT_SECS";

/// Configuration for the mergeability wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// How long to keep asking before giving up.
    ///
    /// Default: 5 minutes. Configure via `DISPATCH_MERGEABLE_TIMEOUT_SECS`.
    pub wait_timeout: Duration,

    /// Delay before each fetch, including the first.
    ///
    /// Default: 1 second.
    pub recheck_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PollConfig {
    /// Creates a new `PollConfig` with default values.
    pub fn new() -> Self {
        PollConfig {
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            recheck_interval: Duration::from_secs(DEFAULT_RECHECK_INTERVAL_SECS),
        }
    }

    /// Creates a `PollConfig` from environment variables.
    ///
    /// Reads `DISPATCH_MERGEABLE_TIMEOUT_SECS` for the wait timeout.
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_timeout_var(std::env::var(WAIT_TIMEOUT_ENV).ok().as_deref())
    }

    fn from_timeout_var(value: Option<&str>) -> Self {
        let timeout_secs = value
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS);

        PollConfig {
            wait_timeout: Duration::from_secs(timeout_secs),
            ..Self::new()
        }
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    pub fn with_recheck_interval(mut self, recheck_interval: Duration) -> Self {
        self.recheck_interval = recheck_interval;
        self
    }
}
