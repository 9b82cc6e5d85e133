//! Run command - React to a GitHub Actions event.
//!
//! Classifies the event, resolves the affected root modules and runs
//! terraform against them. Transcripts stream to stdout/stderr as the
//! commands run; the final status is the process exit code.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tfgate_core::config::{DEFAULT_GITHUB_API_URL, DEFAULT_TERRAFORM_BIN};
use tfgate_core::orchestrator::absolute_dir;
use tfgate_core::{event, CliError, GatewayConfig, GithubClient, Orchestrator, RunOutcome, Trigger};
use tfgate_iac::ModuleGraph;
use tfgate_runner::ProcessRunner;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Base directory of the Terraform module tree
    #[arg(short = 'd', long = "base-dir")]
    base_dir: PathBuf,

    /// Root directory of the git checkout; PR file paths are relative to it
    #[arg(long = "git-rootdir")]
    git_rootdir: PathBuf,

    /// Name of the triggering event (`GITHUB_EVENT_NAME`)
    #[arg(long, conflicts_with = "github_context")]
    event_name: Option<String>,

    /// Path of the event payload (`GITHUB_EVENT_PATH`)
    #[arg(long, conflicts_with = "github_context")]
    event_path: Option<PathBuf>,

    /// Whole `github` context as JSON, instead of event name and path
    #[arg(long)]
    github_context: Option<String>,

    /// Merge the pull request after a successful apply
    #[arg(long)]
    automerge: bool,

    /// Kill terraform commands running longer than this many seconds (0 = never)
    #[arg(long, env = "TFGATE_COMMAND_TIMEOUT", default_value_t = 0)]
    command_timeout: u64,

    /// Terraform binary
    #[arg(long, env = "FILE_PATH_TERRAFORM", default_value = DEFAULT_TERRAFORM_BIN)]
    terraform_bin: String,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    github_api_url: String,

    /// Test identifier forwarded to fake API servers
    #[arg(long, env = "E2E_TEST_ID", hide = true)]
    e2e_test_id: Option<String>,
}

impl RunArgs {
    fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::default()
            .with_terraform_bin(&self.terraform_bin)
            .with_command_timeout(self.command_timeout)
            .with_github_api_url(&self.github_api_url)
            .with_github_token(self.github_token.clone())
            .with_e2e_test_id(self.e2e_test_id.clone())
    }

    /// Input checks that need no external call.
    fn validate(&self) -> Result<(), CliError> {
        if self.github_context.is_none() {
            if self.event_name.as_deref().map_or(true, str::is_empty) {
                return Err(CliError::invalid_argument("--event-name is required"));
            }
            if self.event_path.is_none() {
                return Err(CliError::invalid_argument("--event-path is required"));
            }
        }

        if let Err(err) = fs::metadata(&self.base_dir) {
            return Err(CliError::invalid_argument(format!(
                "invalid base dir: {}: {}",
                self.base_dir.display(),
                err
            )));
        }
        Ok(())
    }

    fn trigger(&self) -> Result<Option<Trigger>, CliError> {
        let classified = match (&self.github_context, &self.event_name, &self.event_path) {
            (Some(context), _, _) => event::from_github_context(context),
            (None, Some(name), Some(path)) => event::from_event_file(name, path),
            _ => return Err(CliError::invalid_argument("--event-name is required")),
        };
        classified.map_err(|err| CliError::invalid_argument(err.to_string()))
    }
}

pub async fn execute(args: RunArgs) -> Result<()> {
    args.validate()?;

    let Some(trigger) = args.trigger()? else {
        print_outcome(&RunOutcome::Skipped);
        return Ok(());
    };
    info!(trigger = ?trigger, "Event classified");

    let base_dir = absolute_dir(&args.base_dir)?;
    let git_root = absolute_dir(&args.git_rootdir)?;
    let graph = ModuleGraph::from_base_dir(&base_dir)
        .with_context(|| format!("failed to parse modules under {}", base_dir.display()))?;

    let config = args.gateway_config();
    let github = GithubClient::new(&config).context("failed to create GitHub client")?;
    let terraform = config.terraform_runner(Arc::new(ProcessRunner::new()));

    let orchestrator = Orchestrator::new(graph, git_root, terraform, Arc::new(github))
        .with_automerge(args.automerge)
        .with_mergeable_polling(
            config.mergeable_poll_attempts,
            config.mergeable_poll_interval(),
        );

    let outcome = orchestrator.run(&trigger).await?;
    print_outcome(&outcome);
    outcome.into_result()?;
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    if let Some(message) = outcome.message() {
        println!("{}", message);
    }
}
