//! Violation reporters.

use std::io::{self, Write};

use crate::rules::RuleViolation;

/// Receives violations as the engine finds them.
pub trait Reporter {
    fn report(&mut self, violation: &RuleViolation);
}

/// Writes each violation to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, violation: &RuleViolation) {
        let mut stdout = io::stdout().lock();
        // Broken pipes on stdout are not worth failing the check for.
        let _ = writeln!(stdout, "{}", violation);
    }
}

/// Keeps every reported violation in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    pub violations: Vec<RuleViolation>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far, rendered the way [`ConsoleReporter`] prints it.
    pub fn rendered(&self) -> String {
        self.violations.iter().map(|v| format!("{}\n", v)).collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, violation: &RuleViolation) {
        self.violations.push(violation.clone());
    }
}
