//! Messages for the lint flow.

use crate::reconcile::{IdempotencyClass, Notification, Sentinel};
use crate::types::outcome::is_v1_recipe;
use crate::types::{LintOutcome, LintState};

use super::{MAX_DETAILS_LEN, RunLink, truncate_with_suffix};

const PING_CORE: &str = "Please ping the 'conda-forge/core' team (using the @ notation in a comment) if you believe this is a bug.";

const V1_NOT_LINTABLE: &str = "This is a v1 recipe and not yet lintable. We are working on it!";

/// Renders the lint report for an outcome already classified as `state`.
pub fn render_lint(outcome: &LintOutcome, state: LintState, run_link: &RunLink) -> Notification {
    let sentinel = Sentinel::Linter.text();
    let files = outcome.recipe_files();
    let blocks = files
        .iter()
        .map(|f| format!("```{}```", f))
        .collect::<Vec<_>>()
        .join(", ");

    let mut text = match state {
        LintState::MergeConflict => format!(
            "{}\n\n\
             I was trying to look for recipes to lint for you, but it appears we have a merge conflict.\n\
             Please try to merge or rebase with the base branch to resolve this conflict.\n\n\
             {}\n",
            sentinel, PING_CORE
        ),
        LintState::NoRecipes => format!(
            "{}\n\n\
             I was trying to look for recipes to lint for you, but couldn't find any.\n\
             {}\n",
            sentinel, PING_CORE
        ),
        LintState::Good => good_text(&blocks),
        LintState::Mixed => format!(
            "{}I do have some suggestions for making it better though...\n\n{}\n",
            good_text(&blocks),
            findings(outcome)
        ),
        LintState::Bad => format!(
            "{}\n\n\
             I wanted to let you know that I linted all conda-recipes in your PR ({}) and found some lint.\n\n\
             Here's what I've got...\n\n{}\n",
            sentinel,
            blocks,
            findings(outcome)
        ),
    };
    text.push_str(&run_link.lint_footer());

    Notification::new(Sentinel::Linter, IdempotencyClass::Lint(state), text)
}

/// Renders the message used when the linter itself could not run.
///
/// It is filed under the `bad` class.
pub fn render_lint_failure(run_link: &RunLink) -> Notification {
    let text = format!(
        "{}\n\n\
         I Failed to even lint the recipe, probably because of a conda-smithy bug :cry:. \
         This likely indicates a problem in your `meta.yaml`, though. To get a traceback \
         to help figure out what's going on, install conda-smithy and run \
         `conda smithy recipe-lint --conda-forge .` from the recipe directory.\n\n{}",
        Sentinel::Linter.text(),
        run_link.lint_footer()
    );
    Notification::new(Sentinel::Linter, IdempotencyClass::Lint(LintState::Bad), text)
}

fn good_text(blocks: &str) -> String {
    format!(
        "{}\n\n\
         I just wanted to let you know that I linted all conda-recipes in your PR ({}) and found it was in an excellent condition.\n\n",
        Sentinel::Linter.text(),
        blocks
    )
}

/// One section per file with lints, then one per file with hints.
fn findings(outcome: &LintOutcome) -> String {
    let mut sections = Vec::new();
    for file in outcome.recipe_files() {
        if is_v1_recipe(file) {
            sections.push(format!("\nFor **{}**:\n\n{}", file, V1_NOT_LINTABLE));
            continue;
        }
        for items in [outcome.lints.get(file), outcome.hints.get(file)]
            .into_iter()
            .flatten()
            .filter(|items| !items.is_empty())
        {
            let bullets = items
                .iter()
                .map(|item| format!(" * {}", item))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("\nFor **{}**:\n\n{}", file, bullets));
        }
    }
    truncate_with_suffix(&sections.join("\n"), MAX_DETAILS_LEN)
}
