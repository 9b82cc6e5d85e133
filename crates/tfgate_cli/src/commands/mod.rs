//! CLI command definitions.
//!
//! This module defines the command structure for the tfgate CLI.

use clap::{Parser, Subcommand};

pub mod check_rules;
pub mod run;

/// tfgate - Terraform change-impact runner for GitHub pull requests
#[derive(Parser, Debug)]
#[command(name = "tfgate")]
#[command(version, about = "Terraform change-impact runner for GitHub pull requests")]
#[command(long_about = r#"
tfgate finds the Terraform root modules affected by a change and runs
`terraform init`, `plan` and `apply` against them, reporting back on the
pull request.

COMMANDS:
  run          → React to a GitHub Actions event (PR comment, schedule, dispatch)
  check-rules  → Verify backend conventions of every root module

EXIT CODES (run):
  0   - Success, no diff, or event skipped
  1   - Invalid arguments or event
  2   - `terraform plan` found a diff (plan-only)
  3   - Apply refused: PR is not mergeable
  125 - Any other failure

EXIT CODES (check-rules):
  0  - All rules pass
  1  - Invalid arguments
  5  - Rule violations found
  10 - Base directory does not exist
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run terraform for a GitHub Actions event
    Run(run::RunArgs),

    /// Check Terraform files against the standard rules
    #[command(name = "check-rules")]
    CheckRules(check_rules::CheckRulesArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_rules_requires_base_dir() {
        let err = Cli::try_parse_from(["tfgate", "check-rules"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["tfgate", "check-rules", "-d", "infra", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::CheckRules(_)));
    }
}
