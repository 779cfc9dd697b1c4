//! Authorization classification.
//!
//! Decides who we push as and whether that identity may touch workflow files.
//! The answer is advisory: it is only passed to the rerender executor, which
//! leaves `.github/workflows` alone when it is false. Nothing here fails.

use std::fmt;

use crate::effects::GitHubInterpreter;
use crate::effects::requests::authenticated_user;
use crate::github::GitHubApiError;

/// Username used for token-authenticated pushes when no identity is known.
pub const FALLBACK_ACTOR: &str = "x-access-token";

/// The identity an invocation acts as.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub actor: String,
    token: String,
    pub can_change_workflows: bool,
}

impl Credentials {
    pub fn new(actor: impl Into<String>, token: impl Into<String>, can_change_workflows: bool) -> Self {
        Self {
            actor: actor.into(),
            token: token.into(),
            can_change_workflows,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("actor", &self.actor)
            .field("token", &"***")
            .field("can_change_workflows", &self.can_change_workflows)
            .finish()
    }
}

/// True if `actor` is a privileged automation identity or a deploy key is
/// available.
pub fn can_change_workflows(actor: &str, has_deploy_key: bool, privileged: &[String]) -> bool {
    has_deploy_key || privileged.iter().any(|p| p == actor)
}

/// Builds credentials for a known actor.
pub fn classify(
    actor: &str,
    token: impl Into<String>,
    has_deploy_key: bool,
    privileged: &[String],
) -> Credentials {
    Credentials::new(
        actor,
        token,
        can_change_workflows(actor, has_deploy_key, privileged),
    )
}

/// Resolves the actor and classifies it.
///
/// A configured, non-empty actor wins. Otherwise the platform is asked who the
/// token belongs to; if that fails too, [`FALLBACK_ACTOR`] is used.
#[tracing::instrument(skip(github, token, privileged))]
pub async fn authorize<G>(
    github: &G,
    configured_actor: Option<&str>,
    token: impl Into<String>,
    has_deploy_key: bool,
    privileged: &[String],
) -> Credentials
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    let actor = match configured_actor.map(str::trim).filter(|a| !a.is_empty()) {
        Some(actor) => actor.to_string(),
        None => match authenticated_user(github).await {
            Ok(login) => login,
            Err(e) => {
                tracing::warn!(error = %e, fallback = FALLBACK_ACTOR, "could not look up token owner");
                FALLBACK_ACTOR.to_string()
            }
        },
    };

    let credentials = classify(&actor, token, has_deploy_key, privileged);
    tracing::info!(
        actor = %credentials.actor,
        can_change_workflows = credentials.can_change_workflows,
        "classified invocation identity"
    );
    credentials
}
