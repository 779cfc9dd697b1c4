//! Shared test doubles: an in-memory platform, a scripted working copy, and
//! scripted executors, plus helpers for real git repositories on disk.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::effects::{
    CommentData, GitEffect, GitHubEffect, GitHubInterpreter, GitHubResponse, GitInterpreter,
    GitResponse, PrData, RemoteUrl, StatusData,
};
use crate::git::{GitError, PushResult, run_git_sync};
use crate::github::GitHubApiError;
use crate::tools::{FeedstockTools, ToolError, VersionUpdate};
use crate::types::{
    CommentId, ExecutionOutcome, LintOutcome, PrNumber, PrState, PullRequestRef, RepoId, Sha,
};

// ─── Platform ─────────────────────────────────────────────────────────────────

/// What the next `GetPr` should report while the mergeability gate polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAnswer {
    Unknown,
    Mergeable(bool),
    Closed,
}

#[derive(Default)]
struct PlatformState {
    prs: HashMap<PrNumber, PrData>,
    comments: HashMap<PrNumber, Vec<CommentData>>,
    /// Newest first, like the API.
    statuses: HashMap<Sha, Vec<StatusData>>,
    poll_answers: HashMap<PrNumber, VecDeque<PollAnswer>>,
    effects: Vec<GitHubEffect>,
    user: Option<String>,
    ready_rejection: Option<String>,
    failing: Option<fn(&GitHubEffect) -> bool>,
    next_comment_id: u64,
}

/// In-memory stand-in for the GitHub API.
///
/// Clones share state, so a test can keep a handle while the code under test
/// owns another.
#[derive(Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap()
    }

    pub fn with_pr(self, pr: PrData) -> Self {
        self.lock().prs.insert(pr.number, pr);
        self
    }

    pub fn pr(&self, pr: PrNumber) -> Option<PrData> {
        self.lock().prs.get(&pr).cloned()
    }

    pub fn add_comment(&self, pr: PrNumber, body: &str) -> CommentId {
        let mut state = self.lock();
        insert_comment(&mut state, pr, body.to_string()).id
    }

    pub fn comments(&self, pr: PrNumber) -> Vec<CommentData> {
        self.lock().comments.get(&pr).cloned().unwrap_or_default()
    }

    /// Adds `status` as the newest status on `sha`.
    pub fn add_status(&self, sha: &Sha, status: StatusData) {
        self.lock()
            .statuses
            .entry(sha.clone())
            .or_default()
            .insert(0, status);
    }

    /// Statuses on `sha`, newest first.
    pub fn statuses(&self, sha: &Sha) -> Vec<StatusData> {
        self.lock().statuses.get(sha).cloned().unwrap_or_default()
    }

    /// Each subsequent `GetPr` for `pr` applies the next answer first.
    pub fn queue_poll_answers(&self, pr: PrNumber, answers: Vec<PollAnswer>) {
        self.lock()
            .poll_answers
            .entry(pr)
            .or_default()
            .extend(answers);
    }

    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.lock().effects.clone()
    }

    pub fn set_user(&self, login: &str) {
        self.lock().user = Some(login.to_string());
    }

    /// Makes the ready-for-review mutation answer with a GraphQL error.
    pub fn reject_ready(&self, message: &str) {
        self.lock().ready_rejection = Some(message.to_string());
    }

    /// Makes every effect matching `predicate` fail with a permanent error.
    pub fn fail_when(&self, predicate: fn(&GitHubEffect) -> bool) {
        self.lock().failing = Some(predicate);
    }
}

fn insert_comment(state: &mut PlatformState, pr: PrNumber, body: String) -> CommentData {
    state.next_comment_id += 1;
    let id = state.next_comment_id;
    let comment = CommentData {
        id: CommentId(id),
        body,
        html_url: format!("https://github.test/pull/{}#issuecomment-{}", pr.0, id),
    };
    state.comments.entry(pr).or_default().push(comment.clone());
    comment
}

fn not_found(what: impl std::fmt::Display) -> GitHubApiError {
    GitHubApiError::permanent_without_source(format!("Not Found: {}", what))
}

fn apply(state: &mut PlatformState, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::GetPr { pr } => {
            let answer = state.poll_answers.get_mut(&pr).and_then(VecDeque::pop_front);
            let data = state.prs.get_mut(&pr).ok_or_else(|| not_found(pr))?;
            match answer {
                Some(PollAnswer::Unknown) => data.mergeable = None,
                Some(PollAnswer::Mergeable(m)) => data.mergeable = Some(m),
                Some(PollAnswer::Closed) => data.state = PrState::Closed,
                None => {}
            }
            Ok(GitHubResponse::Pr(data.clone()))
        }
        GitHubEffect::GetAuthenticatedUser => state
            .user
            .clone()
            .map(|login| GitHubResponse::User { login })
            .ok_or_else(|| not_found("user")),
        GitHubEffect::EditPrTitle { pr, title } => {
            state.prs.get_mut(&pr).ok_or_else(|| not_found(pr))?.title = title;
            Ok(GitHubResponse::PrUpdated)
        }
        GitHubEffect::SetPrState { pr, state: pr_state } => {
            state.prs.get_mut(&pr).ok_or_else(|| not_found(pr))?.state = pr_state;
            Ok(GitHubResponse::PrUpdated)
        }
        GitHubEffect::MarkReadyForReview { node_id } => {
            if let Some(message) = &state.ready_rejection {
                return Ok(GitHubResponse::MutationRejected {
                    errors: vec![message.clone()],
                });
            }
            let data = state
                .prs
                .values_mut()
                .find(|p| p.node_id == node_id)
                .ok_or_else(|| not_found(&node_id))?;
            data.is_draft = false;
            Ok(GitHubResponse::MarkedReady)
        }
        GitHubEffect::ListComments { pr } => Ok(GitHubResponse::Comments(
            state.comments.get(&pr).cloned().unwrap_or_default(),
        )),
        GitHubEffect::PostComment { pr, body } => {
            Ok(GitHubResponse::CommentPosted(insert_comment(state, pr, body)))
        }
        GitHubEffect::UpdateComment { comment_id, body } => {
            let comment = state
                .comments
                .values_mut()
                .flatten()
                .find(|c| c.id == comment_id)
                .ok_or_else(|| not_found(comment_id))?;
            comment.body = body;
            Ok(GitHubResponse::CommentUpdated(comment.clone()))
        }
        GitHubEffect::ListStatuses { sha } => Ok(GitHubResponse::Statuses(
            state.statuses.get(&sha).cloned().unwrap_or_default(),
        )),
        GitHubEffect::CreateStatus { sha, status } => {
            state.statuses.entry(sha).or_default().insert(0, status);
            Ok(GitHubResponse::StatusCreated)
        }
    }
}

impl GitHubInterpreter for FakePlatform {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        let mut state = self.lock();
        state.effects.push(effect.clone());
        if state.failing.is_some_and(|failing| failing(&effect)) {
            return Err(GitHubApiError::permanent_without_source("injected failure"));
        }
        apply(&mut state, effect)
    }
}

/// An open, non-draft, mergeable PR from a fork.
pub fn pr_data(n: u64) -> PrData {
    PrData {
        number: PrNumber(n),
        node_id: format!("PR_kwDO{}", n),
        title: "Update recipe".to_string(),
        author: "someone".to_string(),
        state: PrState::Open,
        is_draft: false,
        mergeable: Some(true),
        head: PullRequestRef {
            owner: "someone".to_string(),
            repo: "numpy-feedstock".to_string(),
            branch: "patch-1".to_string(),
            is_fork: true,
            head_sha: Sha::new(format!("{:040x}", n)),
        },
    }
}

// ─── Working copy ─────────────────────────────────────────────────────────────

struct GitState {
    effects: Vec<GitEffect>,
    push_result: PushResult,
    fail_push: bool,
}

/// Records git effects instead of running them. Pushes answer with a
/// scripted result.
#[derive(Clone)]
pub struct FakeGit {
    worktree: PathBuf,
    state: Arc<Mutex<GitState>>,
}

impl FakeGit {
    pub fn new(worktree: impl Into<PathBuf>) -> Self {
        Self {
            worktree: worktree.into(),
            state: Arc::new(Mutex::new(GitState {
                effects: Vec::new(),
                push_result: PushResult::Success {
                    pushed_sha: Sha::new("c".repeat(40)),
                },
                fail_push: false,
            })),
        }
    }

    pub fn with_push_result(self, result: PushResult) -> Self {
        self.state.lock().unwrap().push_result = result;
        self
    }

    /// Makes `Push` fail outright, as a network error would.
    pub fn with_failing_push(self) -> Self {
        self.state.lock().unwrap().fail_push = true;
        self
    }

    pub fn effects(&self) -> Vec<GitEffect> {
        self.state.lock().unwrap().effects.clone()
    }

    /// Every push URL that was set, in order.
    pub fn push_urls(&self) -> Vec<RemoteUrl> {
        self.effects()
            .into_iter()
            .filter_map(|e| match e {
                GitEffect::SetPushUrl { url } => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn pushes(&self) -> usize {
        self.effects()
            .iter()
            .filter(|e| matches!(e, GitEffect::Push { .. }))
            .count()
    }
}

impl GitInterpreter for FakeGit {
    type Error = GitError;

    fn worktree(&self) -> &Path {
        &self.worktree
    }

    async fn interpret(&self, effect: GitEffect) -> Result<GitResponse, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.effects.push(effect.clone());
        match effect {
            GitEffect::Clone { .. } | GitEffect::SetPushUrl { .. } => Ok(GitResponse::Ok),
            GitEffect::Push { .. } if state.fail_push => Err(GitError::CommandFailed {
                command: "git push origin HEAD".to_string(),
                stderr: "fatal: unable to access remote".to_string(),
            }),
            GitEffect::Push { .. } => Ok(GitResponse::Pushed(state.push_result.clone())),
        }
    }
}

// ─── Executors ────────────────────────────────────────────────────────────────

/// One executor invocation, as seen by `ScriptedTools`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Rerender { can_change_workflows: bool },
    UpdateVersion { repo: RepoId, input_version: Option<String> },
    Lint,
}

struct ToolsState {
    rerender: Result<ExecutionOutcome, String>,
    version: Result<VersionUpdate, String>,
    lint: Result<LintOutcome, String>,
    calls: Vec<ToolCall>,
}

/// Executors with fixed answers. An `Err(stderr)` answer becomes a failed
/// process.
#[derive(Clone)]
pub struct ScriptedTools {
    state: Arc<Mutex<ToolsState>>,
}

impl Default for ScriptedTools {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(ToolsState {
                rerender: Ok(ExecutionOutcome::unchanged()),
                version: Ok(VersionUpdate::default()),
                lint: Ok(LintOutcome::default()),
                calls: Vec::new(),
            })),
        }
    }
}

fn failed(tool: &'static str, stderr: &str) -> ToolError {
    ToolError::Failed {
        tool,
        code: Some(1),
        stderr: stderr.to_string(),
    }
}

impl ScriptedTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rerender_returns(self, answer: Result<ExecutionOutcome, &str>) -> Self {
        self.state.lock().unwrap().rerender = answer.map_err(str::to_string);
        self
    }

    pub fn version_returns(self, answer: Result<VersionUpdate, &str>) -> Self {
        self.state.lock().unwrap().version = answer.map_err(str::to_string);
        self
    }

    pub fn lint_returns(self, answer: Result<LintOutcome, &str>) -> Self {
        self.state.lock().unwrap().lint = answer.map_err(str::to_string);
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl FeedstockTools for ScriptedTools {
    async fn rerender(
        &self,
        _feedstock: &Path,
        can_change_workflows: bool,
    ) -> Result<ExecutionOutcome, ToolError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ToolCall::Rerender {
            can_change_workflows,
        });
        state.rerender.clone().map_err(|e| failed("rerender", &e))
    }

    async fn update_version(
        &self,
        _feedstock: &Path,
        repo: &RepoId,
        input_version: Option<&str>,
    ) -> Result<VersionUpdate, ToolError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ToolCall::UpdateVersion {
            repo: repo.clone(),
            input_version: input_version.map(str::to_string),
        });
        state.version.clone().map_err(|e| failed("update-version", &e))
    }

    async fn lint(&self, _feedstock: &Path) -> Result<LintOutcome, ToolError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ToolCall::Lint);
        state.lint.clone().map_err(|e| failed("lint", &e))
    }
}

// ─── Real repositories ────────────────────────────────────────────────────────

/// Creates a bare repository under `root` whose `branch` holds one commit
/// adding `README.md`. Returns the bare repository's path.
pub fn seeded_remote(root: &Path, branch: &str) -> PathBuf {
    let remote = root.join("remote.git");
    std::fs::create_dir_all(&remote).unwrap();
    run_git_sync(&remote, &["init", "--bare"]).unwrap();

    let seed = root.join("seed");
    std::fs::create_dir_all(&seed).unwrap();
    run_git_sync(&seed, &["init"]).unwrap();
    commit_file(&seed, "README.md", "# feedstock");
    run_git_sync(
        &seed,
        &["remote", "add", "origin", remote.to_str().unwrap()],
    )
    .unwrap();
    let refspec = format!("HEAD:refs/heads/{}", branch);
    run_git_sync(&seed, &["push", "origin", &refspec]).unwrap();

    remote
}

/// Writes `name` in `worktree` and commits it.
pub fn commit_file(worktree: &Path, name: &str, content: &str) {
    std::fs::write(worktree.join(name), content).unwrap();
    run_git_sync(worktree, &["add", name]).unwrap();
    run_git_sync(
        worktree,
        &[
            "-c",
            "user.name=Test",
            "-c",
            "user.email=test@test.com",
            "commit",
            "-m",
            &format!("Add {}", name),
        ],
    )
    .unwrap();
}
