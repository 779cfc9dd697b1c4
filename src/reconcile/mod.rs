//! Reconciling an outcome into the PR's comment thread and commit status.
//!
//! Nothing here remembers anything between calls. Every decision is made
//! against freshly read platform state, which is what makes repeated and
//! concurrent invocations converge.

pub mod class;
pub mod comment;
pub mod status;

pub use class::{IdempotencyClass, Sentinel, classify_comment};
pub use comment::{CommentPlan, Notification, ReconciledComment, reconcile_comment};
pub use status::{LINTER_CONTEXT, LinterStatus, reconcile_status};
