//! # tfgate_policy
//!
//! Static policy checks over a parsed Terraform module tree.
//!
//! This crate provides:
//! - **Rules**: the [`Rule`] trait and ordered [`RuleSet`]s
//! - **Rule001**: GCS backend bucket and prefix conventions for root modules
//! - **Reporters**: print violations as they are found, or collect them
//! - **Rule Engine**: run a rule set and fold the results into one outcome
//!
//! ## Example
//!
//! ```rust,no_run
//! use tfgate_policy::{ConsoleReporter, RuleEngine, RuleSet};
//!
//! let rules = RuleSet::standard();
//! let outcome = RuleEngine::new(&rules)
//!     .check_base_dir("infra", &mut ConsoleReporter)
//!     .unwrap();
//!
//! if !outcome.passed {
//!     eprintln!("{} violations", outcome.violations.len());
//! }
//! ```

pub mod engine;
pub mod error;
pub mod reporter;
pub mod rule001;
pub mod rules;

pub use engine::{RuleCheckOutcome, RuleEngine, RuleSummary};
pub use error::{PolicyError, PolicyResult};
pub use reporter::{CollectingReporter, ConsoleReporter, Reporter};
pub use rule001::Rule001;
pub use rules::{Rule, RuleSet, RuleViolation};
