//! Messages for the rerender and version-update flows.

use crate::reconcile::{IdempotencyClass, Notification, Sentinel};
use crate::types::PullRequestRef;

use super::{MAX_DETAILS_LEN, RunLink, truncate_with_suffix};

const RERENDER_LOCALLY_URL: &str =
    "https://conda-forge.org/docs/maintainer/updating_pkgs.html#rerendering-with-conda-smithy-locally";

/// The mutating action a message is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Rerender,
    UpdateVersion,
}

impl Action {
    /// Completes "I tried to ... for you".
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Rerender => "rerender",
            Action::UpdateVersion => "update the version",
        }
    }

    /// Extra pointer appended to the tool-error message.
    pub fn help(&self) -> String {
        match self {
            Action::Rerender => format!(
                " or you can try [rerendering locally]({})",
                RERENDER_LOCALLY_URL
            ),
            Action::UpdateVersion => String::new(),
        }
    }
}

/// How an executor run ended, from the reader's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// There were changes but the push was rejected.
    PushFailed { head: PullRequestRef },
    /// The executor failed.
    ToolError,
    /// The executor ran and changed nothing.
    NothingToDo { closing: bool },
    /// Changes were pushed.
    Pushed,
}

impl Report {
    pub fn class(&self) -> IdempotencyClass {
        match self {
            Report::PushFailed { .. } => IdempotencyClass::PushFailed,
            Report::ToolError => IdempotencyClass::ToolError,
            Report::NothingToDo { .. } => IdempotencyClass::NoOp,
            Report::Pushed => IdempotencyClass::Success,
        }
    }

    fn text(&self, action: Action) -> Option<String> {
        let sentinel = Sentinel::Webservice.text();
        match self {
            Report::PushFailed { head } => Some(format!(
                "{}\n\n\
                 I tried to {} for you, but it looks like I wasn't able to push to the {} \
                 branch of {}/{}. Did you check the \"Allow edits from maintainers\" box?\n\n\
                 **NOTE**: Our webservices cannot push to PRs from organization accounts \
                 or PRs from forks made from organization forks because of GitHub \
                 permissions. Please fork the feedstock directly from conda-forge \
                 into your personal GitHub account.\n",
                sentinel,
                action.verb(),
                head.branch,
                head.owner,
                head.repo
            )),
            Report::ToolError => Some(format!(
                "{}\n\n\
                 I tried to {} for you but ran into some issues. Please check the output \
                 logs of the latest webservices GitHub actions workflow run for errors. You can \
                 also ping conda-forge/core for further assistance{}.\n",
                sentinel,
                action.verb(),
                action.help()
            )),
            Report::NothingToDo { closing } => {
                let mut text = format!(
                    "{}\n\nI tried to {} for you, but it looks like there was nothing to do.\n",
                    sentinel,
                    action.verb()
                );
                if *closing {
                    text.push_str("\nI'm closing this PR!");
                }
                Some(text)
            }
            Report::Pushed => None,
        }
    }
}

/// Renders the comment for `report`, if there is anything to say.
///
/// A successful push is silent unless the executor supplied `info`. Info is
/// appended to any other message.
pub fn render_report(
    action: Action,
    report: &Report,
    info: Option<&str>,
    run_link: &RunLink,
) -> Option<Notification> {
    let info = info
        .map(str::trim_end)
        .filter(|i| !i.is_empty())
        .map(|i| truncate_with_suffix(i, MAX_DETAILS_LEN));

    let mut text = match (report.text(action), info) {
        (Some(mut text), Some(info)) => {
            text.push('\n');
            text.push_str(&info);
            text
        }
        (Some(text), None) => text,
        (None, Some(info)) => format!("{}\n\n{}\n", Sentinel::Webservice.text(), info),
        (None, None) => return None,
    };
    text.push_str(&run_link.footer());

    Some(Notification::new(Sentinel::Webservice, report.class(), text))
}
