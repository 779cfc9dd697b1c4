//! User-facing comment text.
//!
//! Every message is rendered together with its [`IdempotencyClass`], so the
//! comment reconciler never has to guess what kind of news it is posting.
//! The wording is load-bearing: older comments without a class marker are
//! classified by the phrases these templates contain.
//!
//! [`IdempotencyClass`]: crate::reconcile::IdempotencyClass

pub mod lint;
pub mod webservice;

use std::fmt;

use crate::types::RepoId;

pub use lint::{render_lint, render_lint_failure};
pub use webservice::{Action, Report, render_report};

/// GitHub's comment size limit (65536 characters).
pub const GITHUB_COMMENT_SIZE_LIMIT: usize = 65536;

/// Budget for the variable part of a message (findings, info text), leaving
/// room for the fixed template around it.
pub const MAX_DETAILS_LEN: usize = 60 * 1024;

/// Link to the workflow run that produced a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLink(String);

impl RunLink {
    /// `{server}/{owner}/{repo}/actions/runs/{run_id}`.
    pub fn new(server_url: &str, repo: &RepoId, run_id: &str) -> Self {
        RunLink(format!(
            "{}/{}/actions/runs/{}",
            server_url.trim_end_matches('/'),
            repo,
            run_id
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Footer for webservice messages.
    pub fn footer(&self) -> String {
        format!(
            "\nThis message was generated by GitHub actions workflow run [{0}]({0}).\n",
            self.0
        )
    }

    /// Footer for lint messages, in small print.
    pub fn lint_footer(&self) -> String {
        format!(
            "\n<sub>This message was generated by GitHub actions workflow run [{0}]({0}).</sub>\n",
            self.0
        )
    }
}

impl fmt::Display for RunLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cuts `s` to at most `max_len` bytes on a char boundary, marking the cut.
pub(crate) fn truncate_with_suffix(s: &str, max_len: usize) -> String {
    const SUFFIX: &str = "... [truncated]";

    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len.saturating_sub(SUFFIX.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &s[..end], SUFFIX)
}

#[cfg(test)]
pub(crate) fn run_link() -> RunLink {
    RunLink::new(
        "https://github.com",
        &RepoId::new("conda-forge", "numpy-feedstock"),
        "42",
    )
}
