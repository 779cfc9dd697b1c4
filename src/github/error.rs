//! Errors from the GitHub API, split by whether another attempt can help.

use thiserror::Error;

/// Rate-limit phrasings GitHub uses on 403 responses.
const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "abuse detection"];

/// Transport failures that never reached GitHub.
const NETWORK_MARKERS: &[&str] = &["timed out", "timeout", "connection", "dns", "network"];

/// Whether a failed request may succeed if sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// 5xx, 429, rate-limited 403, or a dropped connection.
    Transient,

    /// Everything else: 404 on a vanished PR, 422 when a status or comment
    /// body is refused, auth failures, responses of the wrong shape.
    Permanent,
}

impl GitHubErrorKind {
    pub fn is_retriable(&self) -> bool {
        matches!(self, GitHubErrorKind::Transient)
    }

    /// Categorizes a failure from its HTTP status, when there was one, and
    /// its message.
    pub fn categorize(status_code: Option<u16>, message: &str) -> Self {
        let message = message.to_lowercase();
        let mentions = |markers: &[&str]| markers.iter().any(|m| message.contains(m));

        match status_code {
            Some(429) | Some(500..=599) => GitHubErrorKind::Transient,
            Some(403) if mentions(RATE_LIMIT_MARKERS) => GitHubErrorKind::Transient,
            Some(_) => GitHubErrorKind::Permanent,
            None if mentions(NETWORK_MARKERS) => GitHubErrorKind::Transient,
            None => GitHubErrorKind::Permanent,
        }
    }
}

/// A failed GitHub request.
#[derive(Debug, Error)]
#[error(
    "GitHub API error{}: {message}",
    .status_code.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
    #[source]
    pub source: Option<octocrab::Error>,
}

impl GitHubApiError {
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an octocrab error. Only errors GitHub itself answered with carry
    /// a status code; transport failures are judged by their message.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            _ => None,
        };
        let message = err.to_string();

        Self {
            kind: GitHubErrorKind::categorize(status_code, &message),
            status_code,
            message,
            source: Some(err),
        }
    }
}
