//! Core domain types for the dispatch action.
//!
//! This module contains the fundamental types used throughout the application,
//! designed to encode invariants via the type system.

pub mod ids;
pub mod outcome;
pub mod pr;

pub use ids::{CommentId, PrNumber, RepoId, Sha};
pub use outcome::{ExecutionOutcome, LintOutcome, LintState};
pub use pr::{PrState, PullRequestRef};
