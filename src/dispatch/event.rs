//! Parsing of the triggering event.
//!
//! The action runs on `repository_dispatch` events only. Their payload looks
//! like:
//!
//! ```json
//! {
//!   "action": "version_update",
//!   "client_payload": { "pr": 12, "input_version": "1.2.3" },
//!   "repository": { "full_name": "conda-forge/numpy-feedstock" }
//! }
//! ```
//!
//! `client_payload.pr` may be a number or a numeric string. `input_version`
//! may be missing, `null`, or the string `"null"`, all of which mean
//! "auto-detect".

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::types::{PrNumber, RepoId};

/// The only event name the action processes.
pub const REPOSITORY_DISPATCH: &str = "repository_dispatch";

/// Error type for event parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// The workflow was triggered by something other than a dispatch.
    #[error("GitHub event {0} cannot be processed")]
    UnsupportedEvent(String),

    /// The dispatch names an action we do not implement.
    #[error("dispatch action {0} cannot be processed")]
    UnsupportedAction(String),
}

/// Which flow an event asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Rerender,
    VersionUpdate,
    Lint,
}

impl EventKind {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "rerender" => Some(EventKind::Rerender),
            "version_update" => Some(EventKind::VersionUpdate),
            "lint" => Some(EventKind::Lint),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Rerender => "rerender",
            EventKind::VersionUpdate => "version_update",
            EventKind::Lint => "lint",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed automation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationEvent {
    pub kind: EventKind,
    pub pr: PrNumber,
    /// The repository the PR targets.
    pub repository: RepoId,
    /// Version requested for a version update; `None` means auto-detect.
    pub input_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDispatch {
    action: String,
    #[serde(default)]
    client_payload: RawClientPayload,
    repository: RawRepository,
}

#[derive(Debug, Default, Deserialize)]
struct RawClientPayload {
    #[serde(default)]
    pr: Option<Value>,
    #[serde(default)]
    input_version: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: String,
}

/// Parses the event that triggered the workflow.
///
/// `event_name` is `GITHUB_EVENT_NAME`; `payload` is the contents of the file
/// at `GITHUB_EVENT_PATH`.
pub fn parse_event(event_name: &str, payload: &[u8]) -> Result<AutomationEvent, ParseError> {
    if event_name != REPOSITORY_DISPATCH {
        return Err(ParseError::UnsupportedEvent(event_name.to_string()));
    }

    let raw: RawDispatch = serde_json::from_slice(payload)?;

    let kind =
        EventKind::parse(&raw.action).ok_or_else(|| ParseError::UnsupportedAction(raw.action.clone()))?;

    let repository =
        RepoId::parse_full_name(&raw.repository.full_name).ok_or_else(|| ParseError::InvalidField {
            field: "repository.full_name",
            value: raw.repository.full_name.clone(),
        })?;

    let pr = parse_pr(raw.client_payload.pr.as_ref())?;

    let input_version = match kind {
        EventKind::VersionUpdate => parse_input_version(raw.client_payload.input_version.as_ref())?,
        _ => None,
    };

    Ok(AutomationEvent {
        kind,
        pr,
        repository,
        input_version,
    })
}

fn parse_pr(value: Option<&Value>) -> Result<PrNumber, ParseError> {
    let invalid = |value: String| ParseError::InvalidField {
        field: "client_payload.pr",
        value,
    };

    match value {
        Some(Value::Number(n)) => n.as_u64().map(PrNumber).ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(PrNumber)
            .map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
        None => Err(invalid("missing".to_string())),
    }
}

fn parse_input_version(value: Option<&Value>) -> Result<Option<String>, ParseError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() || s == "null" {
                Ok(None)
            } else {
                Ok(Some(s.to_string()))
            }
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(ParseError::InvalidField {
            field: "client_payload.input_version",
            value: other.to_string(),
        }),
    }
}
