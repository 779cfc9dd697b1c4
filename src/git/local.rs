//! `GitInterpreter` backed by the `git` binary.

use std::path::{Path, PathBuf};

use crate::effects::{GitEffect, GitInterpreter, GitResponse};

use super::{GitError, GitResult, clone_branch, push::push_head_to_branch, set_push_url};

/// Runs git effects against one working copy on local disk.
///
/// Git commands are blocking, so each effect runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct LocalGit {
    worktree: PathBuf,
}

impl LocalGit {
    /// Creates an interpreter for the working copy at `worktree`.
    ///
    /// The directory doesn't have to exist until a `Clone` effect creates it.
    pub fn new(worktree: impl Into<PathBuf>) -> Self {
        Self {
            worktree: worktree.into(),
        }
    }
}

impl GitInterpreter for LocalGit {
    type Error = GitError;

    fn worktree(&self) -> &Path {
        &self.worktree
    }

    async fn interpret(&self, effect: GitEffect) -> Result<GitResponse, Self::Error> {
        tracing::debug!(?effect, worktree = %self.worktree.display(), "executing git effect");
        let worktree = self.worktree.clone();
        tokio::task::spawn_blocking(move || execute_git_effect(&worktree, effect))
            .await
            .map_err(|e| GitError::Join(e.to_string()))?
    }
}

fn execute_git_effect(worktree: &Path, effect: GitEffect) -> GitResult<GitResponse> {
    match effect {
        GitEffect::Clone { url, branch } => {
            clone_branch(worktree, &url, &branch)?;
            Ok(GitResponse::Ok)
        }
        GitEffect::SetPushUrl { url } => {
            set_push_url(worktree, &url)?;
            Ok(GitResponse::Ok)
        }
        GitEffect::Push { branch } => Ok(GitResponse::Pushed(push_head_to_branch(
            worktree, &branch,
        )?)),
    }
}
