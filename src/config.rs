//! Runtime settings.
//!
//! The invocation context (event, token, actor) comes from the command line
//! and the Actions environment via `clap`. This struct holds the knobs that
//! shape behavior but rarely change between invocations.

use crate::gate::PollConfig;
use crate::github::RetryConfig;

/// Login of the bot account that opens automated PRs.
pub const DEFAULT_BOT_LOGIN: &str = "conda-forge-admin";

/// Environment variable overriding the bot login.
pub const BOT_LOGIN_ENV: &str = "DISPATCH_BOT_LOGIN";

/// Environment variable holding extra privileged actors, comma separated.
pub const PRIVILEGED_ACTORS_ENV: &str = "DISPATCH_PRIVILEGED_ACTORS";

/// Identities whose tokens may change workflow files.
const DEFAULT_PRIVILEGED_ACTORS: &[&str] = &["conda-forge-admin", "conda-forge-webservices[bot]"];

/// Title the bot gives PRs it opens to request a rerender.
pub const RERENDER_PR_TITLE: &str = "MNT: rerender";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Author login of bot-opened PRs.
    pub bot_login: String,
    /// Actors treated as able to change workflow files.
    pub privileged_actors: Vec<String>,
    /// Mergeability wait.
    pub poll: PollConfig,
    /// Transport-level retry of platform requests.
    pub retry: RetryConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
            privileged_actors: DEFAULT_PRIVILEGED_ACTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            poll: PollConfig::new(),
            retry: RetryConfig::DEFAULT,
        }
    }
}

impl Settings {
    /// Defaults, overridden by environment variables where set.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(BOT_LOGIN_ENV).ok().as_deref(),
            std::env::var(PRIVILEGED_ACTORS_ENV).ok().as_deref(),
            PollConfig::from_env(),
        )
    }

    fn from_vars(bot_login: Option<&str>, extra_privileged: Option<&str>, poll: PollConfig) -> Self {
        let mut settings = Self {
            poll,
            ..Self::default()
        };

        if let Some(login) = bot_login.map(str::trim).filter(|l| !l.is_empty()) {
            settings.bot_login = login.to_string();
        }

        for actor in extra_privileged
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
        {
            if !settings.privileged_actors.iter().any(|p| p == actor) {
                settings.privileged_actors.push(actor.to_string());
            }
        }

        settings
    }

    /// True if a PR with this title and author was opened by the bot to
    /// request a rerender.
    pub fn is_bot_rerender_pr(&self, title: &str, author: &str) -> bool {
        title == RERENDER_PR_TITLE && author == self.bot_login
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bot_login, "conda-forge-admin");
        assert!(settings.privileged_actors.contains(&"conda-forge-admin".to_string()));
        assert_eq!(settings.poll, PollConfig::new());
        assert_eq!(settings.retry, RetryConfig::DEFAULT);
    }

    #[test]
    fn env_overrides() {
        let settings = Settings::from_vars(
            Some(" my-bot "),
            Some("alice, ,conda-forge-admin,bob"),
            PollConfig::new(),
        );
        assert_eq!(settings.bot_login, "my-bot");
        assert_eq!(
            settings.privileged_actors,
            vec![
                "conda-forge-admin".to_string(),
                "conda-forge-webservices[bot]".to_string(),
                "alice".to_string(),
                "bob".to_string(),
            ]
        );
    }

    #[test]
    fn bot_rerender_pr_needs_title_and_author() {
        let settings = Settings::default();
        assert!(settings.is_bot_rerender_pr("MNT: rerender", "conda-forge-admin"));
        assert!(!settings.is_bot_rerender_pr("MNT: rerender", "someone"));
        assert!(!settings.is_bot_rerender_pr("MNT: Re-rendered", "conda-forge-admin"));
    }
}
