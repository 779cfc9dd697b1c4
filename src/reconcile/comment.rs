//! Comment reconciliation: edit the bot comment in place or append a new one.
//!
//! Each sentinel has at most one "current" bot comment per PR: the newest
//! comment whose body contains the sentinel. Older ones are history from
//! earlier classes. It is found by scanning, never by a stored id, so repeated
//! invocations compare against whatever the last one left behind.
//!
//! | existing comment            | action                     |
//! |-----------------------------|----------------------------|
//! | none                        | create                     |
//! | byte-identical body         | nothing                    |
//! | same idempotency class      | edit in place              |
//! | different idempotency class | create (history preserved) |

use crate::effects::requests::{list_comments, post_comment, update_comment};
use crate::effects::{CommentData, GitHubInterpreter};
use crate::github::GitHubApiError;
use crate::types::{CommentId, PrNumber};

use super::class::{IdempotencyClass, Sentinel, classify_comment};

/// A rendered message together with the class it was rendered as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub sentinel: Sentinel,
    pub class: IdempotencyClass,
    /// Full comment body, sentinel and class marker included.
    pub body: String,
}

impl Notification {
    /// Builds a notification from visible text. The class marker is appended.
    pub fn new(sentinel: Sentinel, class: IdempotencyClass, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        let separator = if text.ends_with('\n') { "" } else { "\n" };
        Self {
            sentinel,
            class,
            body: format!("{}{}{}\n", text, separator, class.marker()),
        }
    }
}

/// What reconciliation decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentPlan {
    Create,
    Edit(CommentId),
    Keep(CommentId),
}

/// What reconciliation did, and the comment that now carries the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledComment {
    pub plan: CommentPlan,
    pub comment: CommentData,
}

/// The newest comment carrying `sentinel`, if any. `comments` is oldest
/// first, as GitHub lists them.
pub fn find_bot_comment(comments: &[CommentData], sentinel: Sentinel) -> Option<&CommentData> {
    comments.iter().rfind(|c| sentinel.marks(&c.body))
}

/// Decides between create, edit and keep.
pub fn plan_comment(existing: Option<&CommentData>, notification: &Notification) -> CommentPlan {
    let Some(existing) = existing else {
        return CommentPlan::Create;
    };

    if existing.body == notification.body {
        return CommentPlan::Keep(existing.id);
    }

    if classify_comment(notification.sentinel, &existing.body) == notification.class {
        CommentPlan::Edit(existing.id)
    } else {
        CommentPlan::Create
    }
}

/// Makes the PR's comment thread reflect `notification`.
///
/// Comments are re-read on every call; nothing is cached between calls.
#[tracing::instrument(skip(github, notification), fields(pr = %pr, class = %notification.class))]
pub async fn reconcile_comment<G>(
    github: &G,
    pr: PrNumber,
    notification: &Notification,
) -> Result<ReconciledComment, GitHubApiError>
where
    G: GitHubInterpreter<Error = GitHubApiError>,
{
    let comments = list_comments(github, pr).await?;
    let existing = find_bot_comment(&comments, notification.sentinel);
    let plan = plan_comment(existing, notification);

    let comment = match (plan, existing) {
        (CommentPlan::Keep(_), Some(existing)) => {
            tracing::info!(comment_id = %existing.id, "bot comment already up to date");
            existing.clone()
        }
        (CommentPlan::Edit(id), _) => {
            tracing::info!(comment_id = %id, "editing bot comment in place");
            update_comment(github, id, notification.body.clone()).await?
        }
        _ => {
            tracing::info!("posting new bot comment");
            post_comment(github, pr, notification.body.clone()).await?
        }
    };

    Ok(ReconciledComment { plan, comment })
}
