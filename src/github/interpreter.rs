//! GitHub effect interpreter using octocrab.
//!
//! This module implements the `GitHubInterpreter` trait, executing GitHub effects
//! against the real GitHub API via octocrab.
//!
//! Key implementation details:
//! - REST routes are called directly and deserialized into local response
//!   structs, so only the fields the dispatcher reads need to be present
//! - GraphQL is used for the ready-for-review transition (REST doesn't expose it)
//! - Transient errors are retried with backoff, except on requests that create
//!   something
//! - Proper categorization of errors (transient vs permanent)

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::effects::{
    CommentData, GitHubEffect, GitHubInterpreter, GitHubResponse, PrData, StatusData,
};
use crate::types::{CommentId, PrNumber, PrState, PullRequestRef, Sha};

use super::client::OctocrabClient;
use super::error::GitHubApiError;
use super::retry::{RetryConfig, RetryPolicy, retry_with_backoff};

const PAGE_SIZE: usize = 100;

// ─── Response Types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PullResponse {
    number: u64,
    node_id: String,
    title: String,
    state: String,
    #[serde(default)]
    draft: bool,
    mergeable: Option<bool>,
    user: UserResponse,
    head: HeadResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct HeadResponse {
    #[serde(rename = "ref")]
    ref_field: String,
    sha: String,
    /// `None` when the head repository has been deleted.
    repo: Option<HeadRepoResponse>,
}

#[derive(Debug, Deserialize)]
struct HeadRepoResponse {
    name: String,
    #[serde(default)]
    fork: bool,
    owner: UserResponse,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    context: String,
    state: crate::effects::StatusState,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    target_url: Option<String>,
}

/// The full GraphQL response body. Errors arrive alongside HTTP 200.
#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    #[allow(dead_code)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

const MARK_READY_MUTATION: &str = r#"
mutation($pullRequestId: ID!) {
    markPullRequestReadyForReview(input: {pullRequestId: $pullRequestId}) {
        pullRequest {
            isDraft
        }
    }
}
"#;

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_with_retry(effect, self.retry_config(), |effect| {
            execute_effect(self, effect)
        })
        .await
    }
}

/// Runs `execute` for `effect` under the effect's retry policy.
async fn interpret_with_retry<F, Fut>(
    effect: GitHubEffect,
    retry_config: RetryConfig,
    mut execute: F,
) -> Result<GitHubResponse, GitHubApiError>
where
    F: FnMut(GitHubEffect) -> Fut,
    Fut: Future<Output = Result<GitHubResponse, GitHubApiError>>,
{
    tracing::debug!(?effect, "executing GitHub effect");
    let policy = RetryPolicy::for_effect(&effect);
    retry_with_backoff(retry_config, policy, || execute(effect.clone())).await
}

/// Executes a single effect without retry logic.
async fn execute_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::GetPr { pr } => get_pr(client, pr).await,
        GitHubEffect::GetAuthenticatedUser => get_authenticated_user(client).await,
        GitHubEffect::EditPrTitle { pr, title } => {
            update_pr(client, pr, &UpdatePrRequest::title(title)).await
        }
        GitHubEffect::SetPrState { pr, state } => {
            update_pr(client, pr, &UpdatePrRequest::state(state)).await
        }
        GitHubEffect::MarkReadyForReview { node_id } => mark_ready(client, node_id).await,
        GitHubEffect::ListComments { pr } => list_comments(client, pr).await,
        GitHubEffect::PostComment { pr, body } => post_comment(client, pr, body).await,
        GitHubEffect::UpdateComment { comment_id, body } => {
            update_comment(client, comment_id, body).await
        }
        GitHubEffect::ListStatuses { sha } => list_statuses(client, sha).await,
        GitHubEffect::CreateStatus { sha, status } => create_status(client, sha, status).await,
    }
}

// ─── PR Operations ────────────────────────────────────────────────────────────

async fn get_pr(client: &OctocrabClient, pr: PrNumber) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/pulls/{}",
        client.owner(),
        client.repo_name(),
        pr.0
    );

    let result: Result<PullResponse, _> = client.inner().get(&url, None::<&()>).await;

    match result {
        Ok(pull) => Ok(GitHubResponse::Pr(pr_data_from_response(pull)?)),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

/// Converts the REST PR payload into `PrData`.
///
/// A PR whose head repository was deleted can't be cloned or pushed to, so
/// it is reported as a permanent error.
fn pr_data_from_response(pull: PullResponse) -> Result<PrData, GitHubApiError> {
    let head_repo = pull.head.repo.ok_or_else(|| {
        GitHubApiError::permanent_without_source(format!(
            "PR #{} has no head repository (was the fork deleted?)",
            pull.number
        ))
    })?;

    let state = if pull.state == "open" {
        PrState::Open
    } else {
        PrState::Closed
    };

    Ok(PrData {
        number: PrNumber(pull.number),
        node_id: pull.node_id,
        title: pull.title,
        author: pull.user.login,
        state,
        is_draft: pull.draft,
        mergeable: pull.mergeable,
        head: PullRequestRef {
            owner: head_repo.owner.login,
            repo: head_repo.name,
            branch: pull.head.ref_field,
            is_fork: head_repo.fork,
            head_sha: Sha::new(pull.head.sha),
        },
    })
}

async fn get_authenticated_user(client: &OctocrabClient) -> Result<GitHubResponse, GitHubApiError> {
    let result: Result<UserResponse, _> = client.inner().get("/user", None::<&()>).await;

    match result {
        Ok(user) => Ok(GitHubResponse::User { login: user.login }),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

#[derive(Debug, Serialize)]
struct UpdatePrRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'static str>,
}

impl UpdatePrRequest {
    fn title(title: String) -> Self {
        Self {
            title: Some(title),
            state: None,
        }
    }

    fn state(state: PrState) -> Self {
        Self {
            title: None,
            state: Some(state.as_api_str()),
        }
    }
}

async fn update_pr(
    client: &OctocrabClient,
    pr: PrNumber,
    request: &UpdatePrRequest,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/pulls/{}",
        client.owner(),
        client.repo_name(),
        pr.0
    );

    let result: Result<serde_json::Value, _> = client.inner().patch(&url, Some(request)).await;

    match result {
        Ok(_) => Ok(GitHubResponse::PrUpdated),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Ready For Review (GraphQL) ───────────────────────────────────────────────

async fn mark_ready(
    client: &OctocrabClient,
    node_id: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let result: Result<GraphQlEnvelope, _> = client
        .inner()
        .graphql(&serde_json::json!({
            "query": MARK_READY_MUTATION,
            "variables": { "pullRequestId": node_id },
        }))
        .await;

    match result {
        Ok(envelope) => Ok(mutation_response(envelope)),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

fn mutation_response(envelope: GraphQlEnvelope) -> GitHubResponse {
    match envelope.errors {
        Some(errors) if !errors.is_empty() => GitHubResponse::MutationRejected {
            errors: errors.into_iter().map(|e| e.message).collect(),
        },
        _ => GitHubResponse::MarkedReady,
    }
}

// ─── Comments ─────────────────────────────────────────────────────────────────

fn comment_data(comment: CommentResponse) -> CommentData {
    CommentData {
        id: CommentId(comment.id),
        body: comment.body.unwrap_or_default(),
        html_url: comment.html_url,
    }
}

async fn list_comments(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut all_comments = Vec::new();

    loop {
        let url = format!(
            "/repos/{}/{}/issues/{}/comments?per_page={}&page={}",
            client.owner(),
            client.repo_name(),
            pr.0,
            PAGE_SIZE,
            page
        );

        let result: Result<Vec<CommentResponse>, _> =
            client.inner().get(&url, None::<&()>).await;

        match result {
            Ok(items) => {
                let is_last_page = items.len() < PAGE_SIZE;
                all_comments.extend(items.into_iter().map(comment_data));

                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::Comments(all_comments))
}

#[derive(Serialize)]
struct CommentRequest {
    body: String,
}

async fn post_comment(
    client: &OctocrabClient,
    pr: PrNumber,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/issues/{}/comments",
        client.owner(),
        client.repo_name(),
        pr.0
    );

    let result: Result<CommentResponse, _> = client
        .inner()
        .post(&url, Some(&CommentRequest { body }))
        .await;

    match result {
        Ok(comment) => Ok(GitHubResponse::CommentPosted(comment_data(comment))),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

async fn update_comment(
    client: &OctocrabClient,
    comment_id: CommentId,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/issues/comments/{}",
        client.owner(),
        client.repo_name(),
        comment_id.0
    );

    let result: Result<CommentResponse, _> = client
        .inner()
        .patch(&url, Some(&CommentRequest { body }))
        .await;

    match result {
        Ok(comment) => Ok(GitHubResponse::CommentUpdated(comment_data(comment))),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

// ─── Commit Statuses ──────────────────────────────────────────────────────────

fn status_data(status: StatusResponse) -> StatusData {
    StatusData {
        context: status.context,
        state: status.state,
        description: status.description.unwrap_or_default(),
        target_url: status.target_url.filter(|url| !url.is_empty()),
    }
}

async fn list_statuses(client: &OctocrabClient, sha: Sha) -> Result<GitHubResponse, GitHubApiError> {
    let mut page = 1u32;
    let mut all_statuses = Vec::new();

    loop {
        let url = format!(
            "/repos/{}/{}/commits/{}/statuses?per_page={}&page={}",
            client.owner(),
            client.repo_name(),
            sha.as_str(),
            PAGE_SIZE,
            page
        );

        let result: Result<Vec<StatusResponse>, _> = client.inner().get(&url, None::<&()>).await;

        match result {
            Ok(items) => {
                let is_last_page = items.len() < PAGE_SIZE;
                all_statuses.extend(items.into_iter().map(status_data));

                if is_last_page {
                    break;
                }
                page += 1;
            }
            Err(e) => return Err(GitHubApiError::from_octocrab(e)),
        }
    }

    Ok(GitHubResponse::Statuses(all_statuses))
}

#[derive(Serialize)]
struct CreateStatusRequest<'a> {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<&'a str>,
    description: &'a str,
    context: &'a str,
}

async fn create_status(
    client: &OctocrabClient,
    sha: Sha,
    status: StatusData,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/statuses/{}",
        client.owner(),
        client.repo_name(),
        sha.as_str()
    );

    let request = CreateStatusRequest {
        state: status.state.as_api_str(),
        target_url: status.target_url.as_deref(),
        description: &status.description,
        context: &status.context,
    };

    let result: Result<serde_json::Value, _> = client.inner().post(&url, Some(&request)).await;

    match result {
        Ok(_) => Ok(GitHubResponse::StatusCreated),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::StatusState;
    use serde_json::json;

    fn pull_json(state: &str, repo: serde_json::Value) -> serde_json::Value {
        json!({
            "number": 12,
            "node_id": "PR_kwDOabc",
            "title": "MNT: rerender",
            "state": state,
            "draft": true,
            "mergeable": null,
            "user": { "login": "conda-forge-admin" },
            "head": {
                "ref": "rerender-branch",
                "sha": "abc123",
                "repo": repo,
            },
        })
    }

    #[test]
    fn pr_payload_maps_head_repository() {
        let pull: PullResponse = serde_json::from_value(pull_json(
            "open",
            json!({ "name": "numpy-feedstock", "fork": true, "owner": { "login": "regro" } }),
        ))
        .unwrap();

        let data = pr_data_from_response(pull).unwrap();
        assert_eq!(data.number, PrNumber(12));
        assert_eq!(data.state, PrState::Open);
        assert!(data.is_draft);
        assert_eq!(data.mergeable, None);
        assert_eq!(data.author, "conda-forge-admin");
        assert_eq!(data.head.owner, "regro");
        assert_eq!(data.head.repo, "numpy-feedstock");
        assert_eq!(data.head.branch, "rerender-branch");
        assert!(data.head.is_fork);
        assert_eq!(data.head.head_sha, Sha::new("abc123"));
    }

    #[test]
    fn closed_pr_payload_maps_to_closed() {
        let pull: PullResponse = serde_json::from_value(pull_json(
            "closed",
            json!({ "name": "numpy-feedstock", "owner": { "login": "conda-forge" } }),
        ))
        .unwrap();
        let data = pr_data_from_response(pull).unwrap();
        assert_eq!(data.state, PrState::Closed);
        assert!(!data.head.is_fork);
    }

    #[test]
    fn deleted_head_repository_is_permanent_error() {
        let pull: PullResponse =
            serde_json::from_value(pull_json("open", serde_json::Value::Null)).unwrap();
        let err = pr_data_from_response(pull).unwrap_err();
        assert!(!err.kind.is_retriable());
        assert!(err.message.contains("#12"));
    }

    #[test]
    fn graphql_errors_become_rejection() {
        let envelope: GraphQlEnvelope = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "Pull request is not a draft" }],
        }))
        .unwrap();
        assert_eq!(
            mutation_response(envelope),
            GitHubResponse::MutationRejected {
                errors: vec!["Pull request is not a draft".to_string()]
            }
        );

        let envelope: GraphQlEnvelope = serde_json::from_value(json!({
            "data": { "markPullRequestReadyForReview": { "pullRequest": { "isDraft": false } } },
        }))
        .unwrap();
        assert_eq!(mutation_response(envelope), GitHubResponse::MarkedReady);
    }

    #[test]
    fn status_payload_normalizes_missing_fields() {
        let status: StatusResponse = serde_json::from_value(json!({
            "context": "conda-forge-linter",
            "state": "failure",
            "description": null,
            "target_url": "",
        }))
        .unwrap();
        assert_eq!(
            status_data(status),
            StatusData {
                context: "conda-forge-linter".to_string(),
                state: StatusState::Failure,
                description: String::new(),
                target_url: None,
            }
        );
    }

    #[test]
    fn update_request_serializes_only_the_changed_field() {
        let json = serde_json::to_value(UpdatePrRequest::state(PrState::Closed)).unwrap();
        assert_eq!(json, json!({ "state": "closed" }));

        let json = serde_json::to_value(UpdatePrRequest::title("ENH: x".to_string())).unwrap();
        assert_eq!(json, json!({ "title": "ENH: x" }));
    }

    async fn attempts_under_transient_failure(effect: GitHubEffect) -> u32 {
        let mut attempts = 0;
        let result = interpret_with_retry(effect, RetryConfig::DEFAULT, |_| {
            attempts += 1;
            std::future::ready(Err(GitHubApiError::transient_without_source(
                "502 Bad Gateway",
            )))
        })
        .await;
        assert!(result.is_err());
        attempts
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_on_post_comment_is_not_resent() {
        let post = GitHubEffect::PostComment {
            pr: PrNumber(3),
            body: "Hi! This is the friendly automated conda-forge-linting service.".to_string(),
        };
        assert_eq!(attempts_under_transient_failure(post).await, 1);

        let status = GitHubEffect::CreateStatus {
            sha: Sha::new("abc123"),
            status: StatusData {
                context: "conda-forge-linter".to_string(),
                state: StatusState::Pending,
                description: "Linting in progress...".to_string(),
                target_url: None,
            },
        };
        assert_eq!(attempts_under_transient_failure(status).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_on_read_is_retried() {
        let attempts =
            attempts_under_transient_failure(GitHubEffect::GetPr { pr: PrNumber(3) }).await;
        assert_eq!(attempts, RetryConfig::DEFAULT.max_retries + 1);
    }

    #[test]
    fn comment_body_defaults_to_empty() {
        let comment: CommentResponse = serde_json::from_value(json!({
            "id": 5,
            "body": null,
            "html_url": "https://github.com/o/r/pull/1#issuecomment-5",
        }))
        .unwrap();
        let data = comment_data(comment);
        assert_eq!(data.id, CommentId(5));
        assert_eq!(data.body, "");
    }
}
