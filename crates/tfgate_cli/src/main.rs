//! tfgate CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Invalid arguments or event
//! - 2: Diff at `terraform plan`
//! - 3: PR is not mergeable
//! - 5: Rules not passed
//! - 10: Base directory does not exist
//! - 125: Any other error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tfgate_core::error::{EXIT_INTERNAL, EXIT_INVALID_ARGUMENT};
use tfgate_core::{CliError, CoreError};

mod commands;

use commands::{Cli, Commands};

const VERBOSE_FILTER: &str =
    "warn,tfgate_runner=debug,tfgate_iac=debug,tfgate_policy=debug,tfgate_core=debug,tfgate=debug";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                exit_code(EXIT_INVALID_ARGUMENT)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::CheckRules(args) => commands::check_rules::execute(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (code, message) = categorize_error(&e);
            eprintln!("{}", message);
            exit_code(code)
        }
    }
}

/// Logs go to stderr so stdout only carries command transcripts and results.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Find the exit code and message for an error.
///
/// The first [`CliError`] in the chain decides; anything else is internal.
fn categorize_error(e: &anyhow::Error) -> (i32, String) {
    for cause in e.chain() {
        if let Some(cli) = cause.downcast_ref::<CliError>() {
            return (cli.exit_code, cli.message.clone());
        }
        if let Some(CoreError::Cli(cli)) = cause.downcast_ref::<CoreError>() {
            return (cli.exit_code, cli.message.clone());
        }
    }
    (EXIT_INTERNAL, format!("{:#}", e))
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}
