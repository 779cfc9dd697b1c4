//! GitHub API client and effect interpreter.
//!
//! This module provides the implementation for executing GitHub effects via the octocrab
//! library. It implements the `GitHubInterpreter` trait defined in the effects module.
//!
//! Key features:
//! - Exponential backoff retry for transient failures on repeatable requests
//! - Distinguishes transient vs permanent errors
//! - GraphQL for the draft to ready-for-review transition

mod client;
mod error;
mod interpreter;
mod retry;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use retry::{RetryConfig, RetryPolicy};
