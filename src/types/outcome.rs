//! The outcome vocabulary every executor result is normalized into.
//!
//! Reconciliation never looks at raw tool output: rerender and version-update
//! results become an [`ExecutionOutcome`], lint results become a
//! [`LintOutcome`] which is then classified into exactly one [`LintState`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Normalized result of a mutating executor (rerender or version update).
///
/// `error` takes precedence over `changed` when rendering a message; `changed`
/// is only meaningful when `error` is false.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// The executor committed something to the working copy.
    pub changed: bool,
    /// The executor failed.
    pub error: bool,
    /// Extra text the executor wants shown to the user.
    pub info_message: Option<String>,
}

impl ExecutionOutcome {
    pub fn changed() -> Self {
        Self {
            changed: true,
            ..Self::default()
        }
    }

    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn failed() -> Self {
        Self {
            error: true,
            ..Self::default()
        }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info_message = Some(info.into());
        self
    }

    /// True when there is a committed change that should be pushed.
    pub fn should_push(&self) -> bool {
        self.changed && !self.error
    }
}

/// File name of a v1 (`recipe.yaml`) recipe, which the linter cannot handle yet.
pub const V1_RECIPE_FILE_NAME: &str = "recipe.yaml";

/// Per-file lint and hint findings reported by the linter.
///
/// Maps are ordered so rendered messages are stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LintOutcome {
    #[serde(default)]
    pub lints: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub hints: BTreeMap<String, Vec<String>>,
}

impl LintOutcome {
    /// Every recipe file mentioned in either map, in sorted order.
    pub fn recipe_files(&self) -> BTreeSet<&str> {
        self.lints
            .keys()
            .chain(self.hints.keys())
            .map(String::as_str)
            .collect()
    }

    /// Classifies the outcome. `mergeable` is the answer of the mergeability gate.
    ///
    /// The rules are checked in order and the first match wins, so this is a
    /// total function:
    ///
    /// 1. not mergeable → `MergeConflict`, whatever the findings are
    /// 2. no recipe files at all → `NoRecipes`
    /// 3. any lint on a linted recipe → `Bad`
    /// 4. any hint, or any v1 recipe → `Mixed`
    /// 5. otherwise → `Good`
    pub fn classify(&self, mergeable: bool) -> LintState {
        if !mergeable {
            return LintState::MergeConflict;
        }

        let files = self.recipe_files();
        if files.is_empty() {
            return LintState::NoRecipes;
        }

        let mut has_hints = false;
        for file in files {
            if is_v1_recipe(file) {
                has_hints = true;
                continue;
            }
            if self.lints.get(file).is_some_and(|l| !l.is_empty()) {
                return LintState::Bad;
            }
            if self.hints.get(file).is_some_and(|h| !h.is_empty()) {
                has_hints = true;
            }
        }

        if has_hints {
            LintState::Mixed
        } else {
            LintState::Good
        }
    }
}

/// Returns true if the path names a v1 recipe.
pub fn is_v1_recipe(file: &str) -> bool {
    Path::new(file)
        .file_name()
        .is_some_and(|name| name == V1_RECIPE_FILE_NAME)
}

/// The five mutually exclusive lint quality classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LintState {
    /// The PR cannot be merged; findings are irrelevant.
    MergeConflict,
    /// No recipes were found to lint.
    NoRecipes,
    /// At least one lint.
    Bad,
    /// No lints, but hints.
    Mixed,
    /// Neither lints nor hints.
    Good,
}

impl LintState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintState::MergeConflict => "merge_conflict",
            LintState::NoRecipes => "no_recipes",
            LintState::Bad => "bad",
            LintState::Mixed => "mixed",
            LintState::Good => "good",
        }
    }
}

impl std::fmt::Display for LintState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn findings(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(f, items)| (f.to_string(), items.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn arb_findings() -> impl Strategy<Value = BTreeMap<String, Vec<String>>> {
        prop::collection::btree_map(
            prop_oneof![
                Just("recipe/meta.yaml".to_string()),
                Just("recipe/recipe.yaml".to_string()),
                "recipe/[a-z]{1,8}/meta\\.yaml",
            ],
            prop::collection::vec("[a-z ]{1,20}", 0..3),
            0..4,
        )
    }

    fn arb_lint_outcome() -> impl Strategy<Value = LintOutcome> {
        (arb_findings(), arb_findings()).prop_map(|(lints, hints)| LintOutcome { lints, hints })
    }

    #[test]
    fn empty_outcome_is_no_recipes() {
        assert_eq!(LintOutcome::default().classify(true), LintState::NoRecipes);
    }

    #[test]
    fn hints_only_is_mixed() {
        let outcome = LintOutcome {
            lints: findings(&[("recipe/meta.yaml", &[])]),
            hints: findings(&[("recipe/meta.yaml", &["use noarch"])]),
        };
        assert_eq!(outcome.classify(true), LintState::Mixed);
    }

    #[test]
    fn any_lint_is_bad_even_with_hints() {
        let outcome = LintOutcome {
            lints: findings(&[("recipe/meta.yaml", &["missing license"])]),
            hints: findings(&[("recipe/meta.yaml", &["use noarch"])]),
        };
        assert_eq!(outcome.classify(true), LintState::Bad);
    }

    #[test]
    fn clean_recipe_is_good() {
        let outcome = LintOutcome {
            lints: findings(&[("recipe/meta.yaml", &[])]),
            hints: BTreeMap::new(),
        };
        assert_eq!(outcome.classify(true), LintState::Good);
    }

    #[test]
    fn v1_recipe_counts_as_hint() {
        let outcome = LintOutcome {
            lints: findings(&[("recipe/recipe.yaml", &["ignored"])]),
            hints: BTreeMap::new(),
        };
        assert_eq!(outcome.classify(true), LintState::Mixed);
    }

    proptest! {
        #[test]
        fn merge_conflict_takes_precedence(outcome in arb_lint_outcome()) {
            prop_assert_eq!(outcome.classify(false), LintState::MergeConflict);
        }

        #[test]
        fn classification_agrees_with_findings(outcome in arb_lint_outcome()) {
            let state = outcome.classify(true);
            let files = outcome.recipe_files();
            let any_lint = files.iter().any(|f| {
                !is_v1_recipe(f) && outcome.lints.get(*f).is_some_and(|l| !l.is_empty())
            });
            let expected = if files.is_empty() {
                LintState::NoRecipes
            } else if any_lint {
                LintState::Bad
            } else if files.iter().any(|f| {
                is_v1_recipe(f) || outcome.hints.get(*f).is_some_and(|h| !h.is_empty())
            }) {
                LintState::Mixed
            } else {
                LintState::Good
            };
            prop_assert_eq!(state, expected);
        }
    }
}
