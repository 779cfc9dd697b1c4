//! Everything one invocation needs, passed by reference.

use crate::auth::Credentials;
use crate::config::Settings;
use crate::messages::RunLink;

/// The collaborators and settings for handling one event.
///
/// - `github` talks to the platform, scoped to the event's repository
/// - `git` operates on the working copy the PR head is cloned into
/// - `tools` runs the executors inside that working copy
#[derive(Debug)]
pub struct ExecutionContext<G, R, T> {
    pub github: G,
    pub git: R,
    pub tools: T,
    pub credentials: Credentials,
    pub settings: Settings,
    pub run_link: RunLink,
}

impl<G, R, T> ExecutionContext<G, R, T> {
    pub fn new(
        github: G,
        git: R,
        tools: T,
        credentials: Credentials,
        settings: Settings,
        run_link: RunLink,
    ) -> Self {
        Self {
            github,
            git,
            tools,
            credentials,
            settings,
            run_link,
        }
    }
}
