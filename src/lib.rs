//! Feedstock dispatch - a GitHub Actions step that rerenders, bumps the
//! version of, or lints a feedstock pull request, then reports the outcome on
//! the PR exactly once per kind of outcome.
//!
//! This library provides the reconciliation logic and its collaborators; the
//! binary wires them to the Actions environment.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod effects;
pub mod gate;
pub mod git;
pub mod github;
pub mod messages;
pub mod ready;
pub mod reconcile;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
