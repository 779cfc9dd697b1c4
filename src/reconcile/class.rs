//! Idempotency classes of bot comments.
//!
//! Two messages in the same class are "the same kind of news": replacing one
//! with the other in place loses nothing the reader cares about. A message in
//! a different class is new news and gets a new comment.
//!
//! Every comment we write embeds its class in a hidden HTML comment:
//!
//! ```text
//! <!-- dispatch-action-class: lint-bad -->
//! ```
//!
//! Comments written before the marker existed are classified by the ordered
//! phrase rules below. The rules are a total function: the first matching
//! phrase wins and a fallback class covers everything else.

use std::fmt;

use crate::types::LintState;

/// Marker that begins the embedded class.
pub const CLASS_MARKER_START: &str = "<!-- dispatch-action-class: ";

/// Marker that ends the embedded class.
pub const CLASS_MARKER_END: &str = " -->";

/// Which bot comment thread a message belongs to.
///
/// The linter and the other webservices each keep their own comment, found
/// by the sentinel line every one of their messages starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    Linter,
    Webservice,
}

impl Sentinel {
    pub fn text(&self) -> &'static str {
        match self {
            Sentinel::Linter => "Hi! This is the friendly automated conda-forge-linting service.",
            Sentinel::Webservice => "Hi! This is the friendly automated conda-forge-webservice.",
        }
    }

    /// Returns true if `body` was written under this sentinel.
    pub fn marks(&self, body: &str) -> bool {
        body.contains(self.text())
    }
}

/// Coarse equivalence class of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdempotencyClass {
    /// A lint report, one class per lint state.
    Lint(LintState),
    /// Changes were made but could not be pushed.
    PushFailed,
    /// The executor failed.
    ToolError,
    /// The executor ran and found nothing to change.
    NoOp,
    /// Changes were pushed; the message only carries extra information.
    Success,
}

impl IdempotencyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdempotencyClass::Lint(LintState::MergeConflict) => "lint-merge-conflict",
            IdempotencyClass::Lint(LintState::NoRecipes) => "lint-no-recipes",
            IdempotencyClass::Lint(LintState::Bad) => "lint-bad",
            IdempotencyClass::Lint(LintState::Mixed) => "lint-mixed",
            IdempotencyClass::Lint(LintState::Good) => "lint-good",
            IdempotencyClass::PushFailed => "push-failed",
            IdempotencyClass::ToolError => "tool-error",
            IdempotencyClass::NoOp => "no-op",
            IdempotencyClass::Success => "success",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let class = match s {
            "lint-merge-conflict" => IdempotencyClass::Lint(LintState::MergeConflict),
            "lint-no-recipes" => IdempotencyClass::Lint(LintState::NoRecipes),
            "lint-bad" => IdempotencyClass::Lint(LintState::Bad),
            "lint-mixed" => IdempotencyClass::Lint(LintState::Mixed),
            "lint-good" => IdempotencyClass::Lint(LintState::Good),
            "push-failed" => IdempotencyClass::PushFailed,
            "tool-error" => IdempotencyClass::ToolError,
            "no-op" => IdempotencyClass::NoOp,
            "success" => IdempotencyClass::Success,
            _ => return None,
        };
        Some(class)
    }

    /// The hidden marker embedded in every message of this class.
    pub fn marker(&self) -> String {
        format!("{}{}{}", CLASS_MARKER_START, self.as_str(), CLASS_MARKER_END)
    }
}

impl fmt::Display for IdempotencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the embedded class marker, if the body has a recognizable one.
///
/// Messages end with their marker, so the last one counts; earlier ones can
/// only come from quoted tool output.
pub fn marker_class(body: &str) -> Option<IdempotencyClass> {
    let start = body.rfind(CLASS_MARKER_START)? + CLASS_MARKER_START.len();
    let len = body[start..].find(CLASS_MARKER_END)?;
    IdempotencyClass::parse(body[start..start + len].trim())
}

/// Ordered phrase rules for lint comments. First match wins.
const LINT_RULES: &[(&str, LintState)] = &[
    (
        "but it appears we have a merge conflict.",
        LintState::MergeConflict,
    ),
    (
        "recipes to lint for you, but couldn't find any.",
        LintState::NoRecipes,
    ),
    ("and found some lint.", LintState::Bad),
    (
        "I do have some suggestions for making it better though...",
        LintState::Mixed,
    ),
    ("and found it was in an excellent condition.", LintState::Good),
];

/// Lint comments matching no rule (such as the "failed to even lint"
/// message) are treated as bad.
const LINT_FALLBACK: LintState = LintState::Bad;

/// Ordered phrase rules for webservice comments. First match wins.
const WEBSERVICE_RULES: &[(&str, IdempotencyClass)] = &[
    ("wasn't able to push to the", IdempotencyClass::PushFailed),
    ("but ran into some issues.", IdempotencyClass::ToolError),
    ("there was nothing to do.", IdempotencyClass::NoOp),
];

/// Webservice comments matching no rule only carry information.
const WEBSERVICE_FALLBACK: IdempotencyClass = IdempotencyClass::Success;

/// Classifies a lint comment body by phrase alone.
pub fn lint_phrase_class(body: &str) -> IdempotencyClass {
    let state = LINT_RULES
        .iter()
        .find(|(phrase, _)| body.contains(phrase))
        .map(|(_, state)| *state)
        .unwrap_or(LINT_FALLBACK);
    IdempotencyClass::Lint(state)
}

/// Classifies a webservice comment body by phrase alone.
pub fn webservice_phrase_class(body: &str) -> IdempotencyClass {
    WEBSERVICE_RULES
        .iter()
        .find(|(phrase, _)| body.contains(phrase))
        .map(|(_, class)| *class)
        .unwrap_or(WEBSERVICE_FALLBACK)
}

/// Classifies an existing comment: embedded marker first, phrases second.
pub fn classify_comment(sentinel: Sentinel, body: &str) -> IdempotencyClass {
    if let Some(class) = marker_class(body) {
        return class;
    }
    match sentinel {
        Sentinel::Linter => lint_phrase_class(body),
        Sentinel::Webservice => webservice_phrase_class(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_CLASSES: [IdempotencyClass; 9] = [
        IdempotencyClass::Lint(LintState::MergeConflict),
        IdempotencyClass::Lint(LintState::NoRecipes),
        IdempotencyClass::Lint(LintState::Bad),
        IdempotencyClass::Lint(LintState::Mixed),
        IdempotencyClass::Lint(LintState::Good),
        IdempotencyClass::PushFailed,
        IdempotencyClass::ToolError,
        IdempotencyClass::NoOp,
        IdempotencyClass::Success,
    ];

    #[test]
    fn class_names_parse_back() {
        for class in ALL_CLASSES {
            assert_eq!(IdempotencyClass::parse(class.as_str()), Some(class));
            assert_eq!(marker_class(&format!("text\n{}\n", class.marker())), Some(class));
        }
        assert_eq!(IdempotencyClass::parse("lint-ugly"), None);
    }

    #[test]
    fn marker_wins_over_phrases() {
        let body = format!(
            "{}\n\nand found it was in an excellent condition.\n{}",
            Sentinel::Linter.text(),
            IdempotencyClass::Lint(LintState::Bad).marker()
        );
        assert_eq!(
            classify_comment(Sentinel::Linter, &body),
            IdempotencyClass::Lint(LintState::Bad)
        );
    }

    #[test]
    fn quoted_marker_in_findings_does_not_override_class() {
        use crate::reconcile::Notification;

        let n = Notification::new(
            Sentinel::Linter,
            IdempotencyClass::Lint(LintState::Bad),
            format!(
                "{}\n\n * `{}` is not allowed here",
                Sentinel::Linter.text(),
                IdempotencyClass::Lint(LintState::Good).marker()
            ),
        );
        assert_eq!(
            classify_comment(Sentinel::Linter, &n.body),
            IdempotencyClass::Lint(LintState::Bad)
        );
    }

    #[test]
    fn unknown_marker_falls_back_to_phrases() {
        let body = format!(
            "{}nonsense{}\nand found it was in an excellent condition.",
            CLASS_MARKER_START, CLASS_MARKER_END
        );
        assert_eq!(
            classify_comment(Sentinel::Linter, &body),
            IdempotencyClass::Lint(LintState::Good)
        );
    }

    #[test]
    fn mixed_beats_good_because_it_extends_it() {
        let body = "I linted all conda-recipes in your PR and found it was in an excellent condition.\n\
                    I do have some suggestions for making it better though...";
        assert_eq!(
            lint_phrase_class(body),
            IdempotencyClass::Lint(LintState::Mixed)
        );
    }

    #[test]
    fn unrecognized_lint_comment_is_bad() {
        assert_eq!(
            lint_phrase_class("I Failed to even lint the recipe"),
            IdempotencyClass::Lint(LintState::Bad)
        );
    }

    #[test]
    fn webservice_phrases() {
        assert_eq!(
            webservice_phrase_class("it looks like I wasn't able to push to the main branch"),
            IdempotencyClass::PushFailed
        );
        assert_eq!(
            webservice_phrase_class("I tried to rerender for you but ran into some issues."),
            IdempotencyClass::ToolError
        );
        assert_eq!(
            webservice_phrase_class("it looks like there was nothing to do."),
            IdempotencyClass::NoOp
        );
        assert_eq!(
            webservice_phrase_class("The recipe now uses the v1 format."),
            IdempotencyClass::Success
        );
    }

    #[test]
    fn sentinel_detection() {
        let body = format!("{}\n\nhello", Sentinel::Webservice.text());
        assert!(Sentinel::Webservice.marks(&body));
        assert!(!Sentinel::Linter.marks(&body));
    }

    proptest! {
        /// The merge-conflict phrase takes precedence over every other phrase.
        #[test]
        fn merge_conflict_phrase_has_precedence(
            others in proptest::sample::subsequence(
                LINT_RULES.iter().map(|(p, _)| *p).collect::<Vec<_>>(), 0..=5),
            noise in "[a-z ]{0,40}",
        ) {
            let mut body = format!("{}\n", noise);
            for phrase in &others {
                body.push_str(phrase);
                body.push('\n');
            }
            body.push_str("but it appears we have a merge conflict.");
            prop_assert_eq!(
                lint_phrase_class(&body),
                IdempotencyClass::Lint(LintState::MergeConflict)
            );
        }

        /// Classification is total: any body gets exactly one class, and the
        /// class of a lint comment is always a lint class.
        #[test]
        fn classification_is_total(body in ".{0,200}") {
            prop_assert!(matches!(
                classify_comment(Sentinel::Linter, &body),
                IdempotencyClass::Lint(_)
            ));
            let class = classify_comment(Sentinel::Webservice, &body);
            prop_assert!(ALL_CLASSES.contains(&class));
        }
    }
}
