//! Static rule check entry point.

use std::path::Path;

use tracing::info;

use tfgate_iac::IacError;
use tfgate_policy::{PolicyError, Reporter, RuleCheckOutcome, RuleEngine, RuleSet};

use crate::error::{CliError, CoreResult, EXIT_BASE_DIR_MISSING, EXIT_RULES_NOT_PASSED};

/// Check the module tree under `base_dir` against `rules`.
///
/// Violations go to `reporter` as they are found. A failed check or a missing
/// base directory come back as a [`CliError`] with their dedicated exit code.
pub fn check_rules(
    base_dir: &Path,
    rules: &RuleSet,
    reporter: &mut dyn Reporter,
) -> CoreResult<RuleCheckOutcome> {
    let outcome = match RuleEngine::new(rules).check_base_dir(base_dir, reporter) {
        Ok(outcome) => outcome,
        Err(PolicyError::Iac(IacError::BaseDirNotFound(_))) => {
            return Err(CliError::new(
                EXIT_BASE_DIR_MISSING,
                format!("{} does not exist", base_dir.display()),
            )
            .into());
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        base_dir = %base_dir.display(),
        modules = outcome.modules_checked,
        passed = outcome.passed,
        "Rules checked"
    );

    if !outcome.passed {
        return Err(CliError::new(EXIT_RULES_NOT_PASSED, "not pass").into());
    }
    Ok(outcome)
}
