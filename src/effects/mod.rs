//! Effects-as-data for GitHub and Git operations.
//!
//! This module defines effect types that describe operations without executing them.
//! This enables:
//! - Reconciliation logic that is generic over where effects run
//! - Testability via an in-memory platform and a fake working copy
//! - Logging/tracing of intended operations

pub mod git;
pub mod github;
pub mod interpreter;
pub mod requests;

pub use git::{GitEffect, GitResponse, RemoteUrl};
pub use github::{CommentData, GitHubEffect, GitHubResponse, PrData, StatusData, StatusState};
pub use interpreter::{GitHubInterpreter, GitInterpreter};
