//! Plan/apply orchestration.
//!
//! A run resolves its target root modules, initializes and plans all of them,
//! and in apply mode applies them once the pull request is mergeable. Every
//! step is awaited in order; the first hard failure ends the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use tfgate_iac::{path, Module, ModuleGraph, TerraformRunner};

use crate::error::{
    CliError, CoreError, CoreResult, EXIT_NOT_MERGEABLE, EXIT_PLAN_DIFF,
};
use crate::event::{Mode, Repository, Trigger};
use crate::github::{self, GithubApi};
use crate::report::Report;

/// How a run ended, short of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The event does not concern tfgate.
    Skipped,
    /// No root module is affected.
    NoTargets { pull_request: Option<u64> },
    /// Plan-only run without pending changes.
    Clean,
    /// Plan-only run with pending changes in at least one module.
    DiffPresent,
    /// Apply refused because the pull request is not mergeable.
    Blocked,
    /// Every target applied.
    Applied { merged: bool },
}

impl RunOutcome {
    /// Line printed to stdout for this outcome, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Skipped => Some("skipped".to_string()),
            // Scheduled runs have no pull request and report number 0.
            Self::NoTargets { pull_request } => Some(format!(
                "no file changed in PR: {}",
                pull_request.unwrap_or(0)
            )),
            Self::Blocked => Some("pr is not mergeable".to_string()),
            _ => None,
        }
    }

    /// Process exit code of this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DiffPresent => EXIT_PLAN_DIFF,
            Self::Blocked => EXIT_NOT_MERGEABLE,
            _ => 0,
        }
    }

    /// Outcomes that must end the process with a non-zero code become a
    /// [`CliError`].
    pub fn into_result(self) -> Result<Self, CliError> {
        match self {
            Self::DiffPresent => Err(CliError::new(EXIT_PLAN_DIFF, "diff at `terraform plan`")),
            Self::Blocked => Err(CliError::new(
                EXIT_NOT_MERGEABLE,
                "cannot exec `terraform apply` because PR is not mergeable",
            )),
            other => Ok(other),
        }
    }
}

/// Drives one run against a parsed module graph.
pub struct Orchestrator {
    graph: ModuleGraph,
    git_root: PathBuf,
    terraform: TerraformRunner,
    github: Arc<dyn GithubApi>,
    automerge: bool,
    mergeable_attempts: u32,
    mergeable_interval: Duration,
}

impl Orchestrator {
    /// `git_root` must be absolute; changed paths reported by GitHub are
    /// relative to it.
    pub fn new(
        graph: ModuleGraph,
        git_root: impl Into<PathBuf>,
        terraform: TerraformRunner,
        github: Arc<dyn GithubApi>,
    ) -> Self {
        Self {
            graph,
            git_root: path::normalize(&git_root.into()),
            terraform,
            github,
            automerge: false,
            mergeable_attempts: 5,
            mergeable_interval: Duration::from_secs(2),
        }
    }

    /// Merge the pull request after a successful apply.
    pub fn with_automerge(mut self, automerge: bool) -> Self {
        self.automerge = automerge;
        self
    }

    pub fn with_mergeable_polling(mut self, attempts: u32, interval: Duration) -> Self {
        self.mergeable_attempts = attempts;
        self.mergeable_interval = interval;
        self
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    pub async fn run(&self, trigger: &Trigger) -> CoreResult<RunOutcome> {
        let pull_request = trigger.pull_request();
        let targets = self.resolve_targets(trigger).await?;

        if targets.is_empty() {
            info!("No root module affected");
            return Ok(RunOutcome::NoTargets {
                pull_request: pull_request.map(|(_, n)| n),
            });
        }
        info!(
            targets = targets.len(),
            mode = ?trigger.mode(),
            "Resolved target modules"
        );

        for module in &targets {
            self.terraform.init(module).await?;
        }

        let mut report = Report::new();
        let mut diff = false;
        for module in &targets {
            let plan = self.terraform.plan(module).await?;
            diff |= plan.has_diff;
            report.push(&plan);
        }

        let (repository, number) = match (trigger.mode(), pull_request) {
            (Mode::Apply, Some(pr)) => pr,
            (_, pull_request) => {
                if let Some((repository, number)) = pull_request {
                    self.post_report(repository, number, &report).await?;
                }
                return Ok(if diff {
                    RunOutcome::DiffPresent
                } else {
                    RunOutcome::Clean
                });
            }
        };

        let mergeable = github::wait_for_mergeable(
            self.github.as_ref(),
            repository,
            number,
            self.mergeable_attempts,
            self.mergeable_interval,
        )
        .await?;
        if !mergeable {
            warn!(number, "Pull request is not mergeable; skipping apply");
            self.post_report(repository, number, &report).await?;
            return Ok(RunOutcome::Blocked);
        }

        for module in &targets {
            match self.terraform.apply(module).await {
                Ok(apply) => report.push(&apply),
                Err(err) => {
                    if let Some(transcript) = err.transcript() {
                        report.push(transcript);
                    }
                    self.post_report(repository, number, &report).await?;
                    return Err(err.into());
                }
            }
        }

        self.post_report(repository, number, &report).await?;

        if self.automerge {
            info!(number, "Merging pull request");
            self.github.merge(repository, number).await?;
        }

        Ok(RunOutcome::Applied {
            merged: self.automerge,
        })
    }

    async fn resolve_targets(&self, trigger: &Trigger) -> CoreResult<Vec<&Module>> {
        match trigger {
            Trigger::AllRoots { .. } => Ok(self.graph.roots()),
            Trigger::PullRequest {
                repository, number, ..
            } => {
                let files = github::changed_files(self.github.as_ref(), repository, *number).await?;
                let changed: Vec<PathBuf> = files
                    .iter()
                    .map(|f| path::normalize(&self.git_root.join(f)))
                    .collect();
                Ok(self.graph.impacted_roots(&changed))
            }
        }
    }

    async fn post_report(
        &self,
        repository: &Repository,
        number: u64,
        report: &Report,
    ) -> CoreResult<()> {
        info!(number, sections = report.sections().len(), "Posting report");
        self.github
            .create_comment(repository, number, &report.render())
            .await
    }
}

/// Absolute form of a directory given on the command line.
pub fn absolute_dir(dir: &Path) -> CoreResult<PathBuf> {
    path::absolute(dir).map_err(CoreError::from)
}
