//! Git operation effect types.
//!
//! These types describe git operations as data, without executing them.
//! The interpreter in `crate::git` executes them against a local working copy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::git::push::PushResult;

/// A remote URL that may carry credentials.
///
/// `Debug` and `Display` strip the userinfo part so the URL can appear in logs
/// and error messages.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteUrl(String);

impl RemoteUrl {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteUrl(url.into())
    }

    /// The full URL, credentials included. Only for handing to git.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The URL with any `user:password@` removed.
    pub fn redacted(&self) -> String {
        match self.0.split_once("://") {
            Some((scheme, rest)) => match rest.split_once('@') {
                Some((_, host)) => format!("{}://***@{}", scheme, host),
                None => self.0.clone(),
            },
            None => self.0.clone(),
        }
    }
}

impl fmt::Debug for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RemoteUrl").field(&self.redacted()).finish()
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// A git operation effect.
///
/// Effects are working-copy-scoped: the interpreter is constructed with the
/// path the working copy lives (or will be cloned) at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitEffect {
    /// Clone a single branch of a remote into the working copy path.
    Clone {
        url: RemoteUrl,
        branch: String,
    },

    /// Set the push URL of `origin`.
    SetPushUrl { url: RemoteUrl },

    /// Push the checked-out branch to `origin`.
    Push { branch: String },
}

/// Response from a git effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitResponse {
    /// Operation completed successfully with no specific return value.
    Ok,
    /// Result of a push.
    Pushed(PushResult),
}
