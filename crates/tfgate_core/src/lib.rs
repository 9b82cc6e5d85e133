//! # tfgate_core
//!
//! Orchestration layer of tfgate.
//!
//! This crate turns a GitHub Actions event into a run: it classifies the
//! event, asks GitHub which files a pull request changed, resolves the
//! affected root modules, drives `terraform init`/`plan`/`apply` through
//! [`tfgate_iac::TerraformRunner`] and reports back on the pull request.
//!
//! # Architecture
//!
//! - **Event**: classify the triggering event into a [`Trigger`]
//! - **GitHub**: the [`GithubApi`] seam and its `reqwest` client
//! - **Orchestrator**: the init/plan/apply state machine
//! - **Checks**: the static rule check with its exit codes
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use tfgate_core::{event, GatewayConfig, GithubClient, Orchestrator};
//! use tfgate_iac::ModuleGraph;
//! use tfgate_runner::ProcessRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::default();
//! let Some(trigger) = event::from_event_file("issue_comment", Path::new("event.json"))? else {
//!     println!("skipped");
//!     return Ok(());
//! };
//!
//! let orchestrator = Orchestrator::new(
//!     ModuleGraph::from_base_dir("/repo/infra")?,
//!     "/repo",
//!     config.terraform_runner(Arc::new(ProcessRunner::new())),
//!     Arc::new(GithubClient::new(&config)?),
//! );
//! let outcome = orchestrator.run(&trigger).await?;
//! std::process::exit(outcome.exit_code());
//! # }
//! ```

pub mod checks;
pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod orchestrator;
pub mod report;

pub use checks::check_rules;
pub use config::GatewayConfig;
pub use error::{CliError, CoreError, CoreResult};
pub use event::{Mode, Repository, Trigger};
pub use github::{GithubApi, GithubClient};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use report::Report;
