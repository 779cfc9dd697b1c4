//! Pushing the working copy back to the PR's head branch.
//!
//! Pushes use `HEAD:refs/heads/<branch>` refspecs, so they work the same
//! whether the working copy is on the branch or detached.
//!
//! A rejected push is an expected outcome (the PR author didn't allow edits
//! from maintainers, or the fork belongs to an organization), so it is
//! reported as `PushResult::Rejected` rather than as an error. Only failures
//! to run git at all are errors.

use std::path::Path;

use crate::types::Sha;

use super::{GitResult, command_failed, redact_userinfo, rev_parse};

/// Result of a push operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushResult {
    /// Push succeeded.
    Success {
        /// The SHA that was pushed.
        pushed_sha: Sha,
    },

    /// The remote refused the push (non-fast-forward, permissions, auth).
    Rejected {
        /// Details about why the push was rejected, with credentials redacted.
        details: String,
    },

    /// Push was a no-op (remote already has this commit).
    AlreadyUpToDate,
}

/// Markers git prints when the remote turned the push down.
const REJECTION_MARKERS: &[&str] = &[
    "non-fast-forward",
    "rejected",
    "failed to push",
    "Permission to",
    "403",
    "Authentication failed",
    "could not read Username",
    "refusing to allow",
];

/// Returns true if git's stderr describes a push the remote refused.
pub fn is_rejection(stderr: &str) -> bool {
    REJECTION_MARKERS.iter().any(|marker| stderr.contains(marker))
}

/// Push the current HEAD to a remote branch on `origin`.
///
/// # Returns
///
/// The result of the push operation.
pub fn push_head_to_branch(worktree: &Path, branch: &str) -> GitResult<PushResult> {
    let refspec = format!("HEAD:refs/heads/{}", branch);
    let head_sha = rev_parse(worktree, "HEAD")?;

    let args = ["push", "origin", refspec.as_str()];
    let output = super::git_command(worktree).args(args).output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        if stdout.contains("Everything up-to-date") || stderr.contains("Everything up-to-date") {
            return Ok(PushResult::AlreadyUpToDate);
        }
        return Ok(PushResult::Success {
            pushed_sha: head_sha,
        });
    }

    if is_rejection(&stderr) {
        return Ok(PushResult::Rejected {
            details: redact_userinfo(&stderr),
        });
    }

    Err(command_failed(&args, &output))
}
