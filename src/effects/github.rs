//! GitHub API effect types.
//!
//! These types describe GitHub API operations as data, without executing them.
//! The interpreter in `crate::github` executes these effects against the actual
//! GitHub API; tests execute them against an in-memory platform.

use serde::{Deserialize, Serialize};

use crate::types::{CommentId, PrNumber, PrState, PullRequestRef, Sha};

/// Commit status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
    /// Only ever read back, never written by us.
    Error,
}

impl StatusState {
    /// Returns the GitHub API string for this state.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            StatusState::Pending => "pending",
            StatusState::Success => "success",
            StatusState::Failure => "failure",
            StatusState::Error => "error",
        }
    }
}

/// A GitHub API effect.
///
/// Each variant describes a GitHub API operation. Effects are repo-scoped:
/// the interpreter is constructed with a `RepoId`, so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── PR Queries ───────────────────────────────────────────────────────────
    /// Fetch a single PR by number.
    GetPr { pr: PrNumber },

    /// Fetch the login of the user the token authenticates as.
    GetAuthenticatedUser,

    // ─── PR Mutations ─────────────────────────────────────────────────────────
    /// Change a PR's title.
    EditPrTitle { pr: PrNumber, title: String },

    /// Open or close a PR.
    SetPrState { pr: PrNumber, state: PrState },

    /// Transition a draft PR to ready for review (via GraphQL).
    MarkReadyForReview { node_id: String },

    // ─── Comments ─────────────────────────────────────────────────────────────
    /// List all comments on a PR.
    ListComments { pr: PrNumber },

    /// Post a new comment on a PR.
    PostComment { pr: PrNumber, body: String },

    /// Update an existing comment.
    UpdateComment { comment_id: CommentId, body: String },

    // ─── Commit Statuses ──────────────────────────────────────────────────────
    /// List statuses for a commit, newest first.
    ListStatuses { sha: Sha },

    /// Create a commit status.
    CreateStatus { sha: Sha, status: StatusData },
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// PR data returned from the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrData {
    /// The PR number.
    pub number: PrNumber,
    /// The GraphQL node id, needed for the ready-for-review mutation.
    pub node_id: String,
    /// The PR title.
    pub title: String,
    /// Login of the user who opened the PR.
    pub author: String,
    /// Open or closed.
    pub state: PrState,
    /// Whether the PR is a draft.
    pub is_draft: bool,
    /// GitHub's mergeability answer. `None` while GitHub is still computing it.
    pub mergeable: Option<bool>,
    /// The head ref, which is what gets cloned and pushed.
    pub head: PullRequestRef,
}

/// Comment data returned from the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentData {
    /// The comment ID.
    pub id: CommentId,
    /// The comment body.
    pub body: String,
    /// Browser URL of the comment.
    pub html_url: String,
}

/// A commit status, as read or as to be created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusData {
    pub context: String,
    pub state: StatusState,
    pub description: String,
    pub target_url: Option<String>,
}

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetPr`.
    Pr(PrData),

    /// Response to `GetAuthenticatedUser`.
    User { login: String },

    /// Response to `EditPrTitle` and `SetPrState`.
    PrUpdated,

    /// Response to `MarkReadyForReview` when the mutation went through.
    MarkedReady,

    /// Response to `MarkReadyForReview` when GraphQL answered with errors.
    ///
    /// GraphQL reports failures in the response body with HTTP 200, so this is
    /// a response rather than an error. Callers treat it as a soft failure.
    MutationRejected { errors: Vec<String> },

    /// Response to `ListComments`.
    Comments(Vec<CommentData>),

    /// Response to `PostComment`.
    CommentPosted(CommentData),

    /// Response to `UpdateComment`.
    CommentUpdated(CommentData),

    /// Response to `ListStatuses`, newest first.
    Statuses(Vec<StatusData>),

    /// Response to `CreateStatus`.
    StatusCreated,
}

impl GitHubResponse {
    /// Short variant name, for "unexpected response" errors.
    pub fn kind(&self) -> &'static str {
        match self {
            GitHubResponse::Pr(_) => "pr",
            GitHubResponse::User { .. } => "user",
            GitHubResponse::PrUpdated => "pr_updated",
            GitHubResponse::MarkedReady => "marked_ready",
            GitHubResponse::MutationRejected { .. } => "mutation_rejected",
            GitHubResponse::Comments(_) => "comments",
            GitHubResponse::CommentPosted(_) => "comment_posted",
            GitHubResponse::CommentUpdated(_) => "comment_updated",
            GitHubResponse::Statuses(_) => "statuses",
            GitHubResponse::StatusCreated => "status_created",
        }
    }
}
