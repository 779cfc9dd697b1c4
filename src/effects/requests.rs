//! Typed wrappers around single GitHub effects.
//!
//! Each function issues one effect and unpacks the matching response variant.
//! A mismatched variant is an interpreter bug and is reported as a permanent
//! error rather than a panic.

use crate::github::GitHubApiError;
use crate::types::{CommentId, PrNumber, PrState, Sha};

use super::github::{CommentData, GitHubEffect, GitHubResponse, PrData, StatusData};
use super::interpreter::GitHubInterpreter;

fn unexpected(effect: &str, response: &GitHubResponse) -> GitHubApiError {
    GitHubApiError::permanent_without_source(format!(
        "unexpected {} response to {}",
        response.kind(),
        effect
    ))
}

pub async fn get_pr<G>(github: &G, pr: PrNumber) -> Result<PrData, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github.interpret(GitHubEffect::GetPr { pr }).await? {
        GitHubResponse::Pr(data) => Ok(data),
        other => Err(unexpected("get_pr", &other)),
    }
}

pub async fn authenticated_user<G>(github: &G) -> Result<String, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github.interpret(GitHubEffect::GetAuthenticatedUser).await? {
        GitHubResponse::User { login } => Ok(login),
        other => Err(unexpected("get_authenticated_user", &other)),
    }
}

pub async fn edit_pr_title<G>(github: &G, pr: PrNumber, title: String) -> Result<(), GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github.interpret(GitHubEffect::EditPrTitle { pr, title }).await? {
        GitHubResponse::PrUpdated => Ok(()),
        other => Err(unexpected("edit_pr_title", &other)),
    }
}

pub async fn set_pr_state<G>(github: &G, pr: PrNumber, state: PrState) -> Result<(), GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github.interpret(GitHubEffect::SetPrState { pr, state }).await? {
        GitHubResponse::PrUpdated => Ok(()),
        other => Err(unexpected("set_pr_state", &other)),
    }
}

pub async fn list_comments<G>(github: &G, pr: PrNumber) -> Result<Vec<CommentData>, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github.interpret(GitHubEffect::ListComments { pr }).await? {
        GitHubResponse::Comments(comments) => Ok(comments),
        other => Err(unexpected("list_comments", &other)),
    }
}

pub async fn post_comment<G>(
    github: &G,
    pr: PrNumber,
    body: String,
) -> Result<CommentData, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github.interpret(GitHubEffect::PostComment { pr, body }).await? {
        GitHubResponse::CommentPosted(comment) => Ok(comment),
        other => Err(unexpected("post_comment", &other)),
    }
}

pub async fn update_comment<G>(
    github: &G,
    comment_id: CommentId,
    body: String,
) -> Result<CommentData, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github
        .interpret(GitHubEffect::UpdateComment { comment_id, body })
        .await?
    {
        GitHubResponse::CommentUpdated(comment) => Ok(comment),
        other => Err(unexpected("update_comment", &other)),
    }
}

pub async fn list_statuses<G>(github: &G, sha: &Sha) -> Result<Vec<StatusData>, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github
        .interpret(GitHubEffect::ListStatuses { sha: sha.clone() })
        .await?
    {
        GitHubResponse::Statuses(statuses) => Ok(statuses),
        other => Err(unexpected("list_statuses", &other)),
    }
}

pub async fn create_status<G>(
    github: &G,
    sha: &Sha,
    status: StatusData,
) -> Result<(), GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    match github
        .interpret(GitHubEffect::CreateStatus {
            sha: sha.clone(),
            status,
        })
        .await?
    {
        GitHubResponse::StatusCreated => Ok(()),
        other => Err(unexpected("create_status", &other)),
    }
}
