//! Rule evaluation engine.
//!
//! Runs every rule of a [`RuleSet`] over the same module list. The check
//! passes only when no rule reported anything.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use tfgate_iac::{parse_base_dir, path, Module};

use crate::error::PolicyResult;
use crate::reporter::Reporter;
use crate::rules::{RuleSet, RuleViolation};

/// Violations found by a single rule.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub rule_id: String,
    pub violations: usize,
}

/// Result of checking a module tree against a rule set.
#[derive(Debug, Clone, Serialize)]
pub struct RuleCheckOutcome {
    pub passed: bool,
    pub violations: Vec<RuleViolation>,
    pub summaries: Vec<RuleSummary>,
    pub modules_checked: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Applies a rule set to parsed modules.
pub struct RuleEngine<'a> {
    rules: &'a RuleSet,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Check already parsed modules. Each violation is handed to `reporter`
    /// as soon as its rule finishes, and all of them are returned as well.
    pub fn check(
        &self,
        base_dir: &Path,
        modules: &[Module],
        reporter: &mut dyn Reporter,
    ) -> PolicyResult<RuleCheckOutcome> {
        let started_at = Utc::now();
        let mut violations = Vec::new();
        let mut summaries = Vec::new();

        for rule in self.rules.rules() {
            let found = rule.check(base_dir, modules)?;
            for violation in &found {
                reporter.report(violation);
            }
            if !found.is_empty() {
                warn!(rule = rule.id(), violations = found.len(), "Rule not satisfied");
            }
            summaries.push(RuleSummary {
                rule_id: rule.id().to_string(),
                violations: found.len(),
            });
            violations.extend(found);
        }

        let outcome = RuleCheckOutcome {
            passed: violations.is_empty(),
            violations,
            summaries,
            modules_checked: modules.len(),
            started_at,
            completed_at: Utc::now(),
        };

        info!(
            rule_set = %self.rules.name,
            passed = outcome.passed,
            violations = outcome.violations.len(),
            "Rule check finished"
        );
        Ok(outcome)
    }

    /// Parse the tree under `base_dir` and check it.
    pub fn check_base_dir(
        &self,
        base_dir: impl AsRef<Path>,
        reporter: &mut dyn Reporter,
    ) -> PolicyResult<RuleCheckOutcome> {
        let base = path::absolute(base_dir.as_ref())?;
        let modules = parse_base_dir(&base)?;
        self.check(&base, &modules, reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::CollectingReporter;
    use crate::rules::Rule;
    use tfgate_iac::{File, ModulePath};

    struct AlwaysFails(&'static str);

    impl Rule for AlwaysFails {
        fn id(&self) -> &str {
            self.0
        }

        fn name(&self) -> &str {
            "always fails"
        }

        fn check(&self, _base_dir: &Path, modules: &[Module]) -> PolicyResult<Vec<RuleViolation>> {
            Ok(modules
                .iter()
                .map(|m| RuleViolation::missing(self.0, &m.path, "nope"))
                .collect())
        }
    }

    struct AlwaysPasses;

    impl Rule for AlwaysPasses {
        fn id(&self) -> &str {
            "pass"
        }

        fn name(&self) -> &str {
            "always passes"
        }

        fn check(&self, _base_dir: &Path, _modules: &[Module]) -> PolicyResult<Vec<RuleViolation>> {
            Ok(Vec::new())
        }
    }

    fn modules() -> Vec<Module> {
        vec![Module::new("/infra/a", vec![File::new("/infra/a/main.tf")])]
    }

    #[test]
    fn test_any_failing_rule_fails_the_check() {
        let rules = RuleSet::new("test")
            .with_rule(AlwaysFails("first"))
            .with_rule(AlwaysPasses);
        let mut reporter = CollectingReporter::new();

        let outcome = RuleEngine::new(&rules)
            .check(Path::new("/infra"), &modules(), &mut reporter)
            .unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(reporter.violations, outcome.violations);
        assert_eq!(outcome.summaries[0].violations, 1);
        assert_eq!(outcome.summaries[1].violations, 0);
    }

    #[test]
    fn test_passing_rule_after_failing_rule_does_not_reset() {
        let rules = RuleSet::new("test")
            .with_rule(AlwaysPasses)
            .with_rule(AlwaysFails("last"))
            .with_rule(AlwaysPasses);
        let mut reporter = CollectingReporter::new();

        let outcome = RuleEngine::new(&rules)
            .check(Path::new("/infra"), &modules(), &mut reporter)
            .unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.violations[0].module, ModulePath::from("/infra/a"));
    }

    #[test]
    fn test_empty_rule_set_passes() {
        let rules = RuleSet::new("empty");
        let mut reporter = CollectingReporter::new();

        let outcome = RuleEngine::new(&rules)
            .check(Path::new("/infra"), &modules(), &mut reporter)
            .unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.modules_checked, 1);
    }
}
