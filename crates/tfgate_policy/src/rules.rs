//! Policy rules and rule sets.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use tfgate_iac::{Module, ModulePath};

use crate::error::PolicyResult;
use crate::rule001::Rule001;

/// A single finding of a rule against a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,
    pub module: ModulePath,
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl RuleViolation {
    pub fn new(
        rule_id: impl Into<String>,
        module: &ModulePath,
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            module: module.clone(),
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// A required block is missing.
    pub fn missing(rule_id: impl Into<String>, module: &ModulePath, message: impl Into<String>) -> Self {
        Self::new(rule_id, module, message, "true", "false")
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})\n  expected: {}\n  actual: {}",
            self.message, self.module, self.expected, self.actual
        )
    }
}

/// A static check over a parsed module tree.
pub trait Rule: Send + Sync {
    /// Stable identifier, e.g. `rule001`.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Check every module. `base_dir` is the absolute, normalized directory the
    /// modules were parsed from.
    fn check(&self, base_dir: &Path, modules: &[Module]) -> PolicyResult<Vec<RuleViolation>>;
}

/// An ordered set of rules.
#[derive(Default)]
pub struct RuleSet {
    pub name: String,
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    /// Create the standard rule set.
    pub fn standard() -> Self {
        Self::new("Standard Rules").with_rule(Rule001)
    }

    /// Add a rule to the set.
    pub fn add(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.add(rule);
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("name", &self.name)
            .field("rules", &self.rules().map(|r| r.id()).collect::<Vec<_>>())
            .finish()
    }
}
