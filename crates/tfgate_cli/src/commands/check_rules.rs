//! Check-rules command - Verify backend conventions of the module tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tfgate_policy::{ConsoleReporter, RuleSet};

#[derive(Args, Debug)]
pub struct CheckRulesArgs {
    /// Base directory of the Terraform module tree
    #[arg(short = 'd', long = "base-dir")]
    base_dir: PathBuf,
}

pub fn execute(args: CheckRulesArgs) -> Result<()> {
    let rules = RuleSet::standard();
    let mut reporter = ConsoleReporter;

    tfgate_core::check_rules(&args.base_dir, &rules, &mut reporter)?;
    Ok(())
}
