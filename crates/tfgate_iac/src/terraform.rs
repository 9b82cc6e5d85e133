//! Terraform provisioning gateway.
//!
//! Invokes the provisioning binary through a [`CommandRunner`] with
//! `-chdir=<module>` and interprets the exit codes of `init`, `plan` and
//! `apply`.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tfgate_runner::{CommandConfig, CommandRunner, ExecutionResult, RunConfig};

use crate::error::{IacError, IacResult};
use crate::model::{Module, ModulePath};

/// Exit code of `plan -detailed-exitcode` when changes are pending.
pub const PLAN_EXIT_DIFF: i32 = 2;

/// Terraform subcommands issued by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subcommand {
    Init,
    Plan,
    Apply,
}

impl Subcommand {
    pub fn args(&self) -> &'static [&'static str] {
        match self {
            Self::Init => &["init", "-no-color"],
            Self::Plan => &["plan", "-no-color", "-detailed-exitcode"],
            Self::Apply => &["apply", "-no-color", "-auto-approve"],
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Plan => "plan",
            Self::Apply => "apply",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitResult {
    pub module: ModulePath,
    pub stdout: String,
    pub stderr: String,
}

/// Outcome of a `plan` that exited 0 or 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanResult {
    pub module: ModulePath,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub has_diff: bool,
}

/// Outcome of a successful `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub module: ModulePath,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl fmt::Display for PlanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out:\n{}\nerr:\n{}", self.stdout, self.stderr)
    }
}

impl fmt::Display for ApplyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out:\n{}\nerr:\n{}", self.stdout, self.stderr)
    }
}

/// Terraform runner that executes commands through a [`CommandRunner`].
pub struct TerraformRunner {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    run_config: RunConfig,
}

impl TerraformRunner {
    /// Create a new Terraform runner using `terraform` from `PATH`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            binary: "terraform".to_string(),
            run_config: RunConfig::default(),
        }
    }

    /// Use a custom binary path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Kill commands running longer than `seconds` (0 = no limit).
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.run_config = self.run_config.timeout(seconds);
        self
    }

    /// Run `terraform init`; any non-zero exit is a failure.
    pub async fn init(&self, module: &Module) -> IacResult<InitResult> {
        info!(module = %module.path, "Running terraform init");
        let result = self.run_command(Subcommand::Init, &module.path).await?;
        if !result.success() {
            return Err(failure(Subcommand::Init, &module.path, result));
        }
        Ok(InitResult {
            module: module.path.clone(),
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }

    /// Run `terraform plan -detailed-exitcode`; 0 is clean, 2 means a diff is
    /// pending, anything else is a failure.
    pub async fn plan(&self, module: &Module) -> IacResult<PlanResult> {
        info!(module = %module.path, "Running terraform plan");
        let result = self.run_command(Subcommand::Plan, &module.path).await?;
        match result.exit_code {
            0 | PLAN_EXIT_DIFF => Ok(PlanResult {
                module: module.path.clone(),
                has_diff: result.exit_code == PLAN_EXIT_DIFF,
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            }),
            _ => Err(failure(Subcommand::Plan, &module.path, result)),
        }
    }

    /// Run `terraform apply -auto-approve`; any non-zero exit is a failure.
    pub async fn apply(&self, module: &Module) -> IacResult<ApplyResult> {
        info!(module = %module.path, "Running terraform apply");
        let result = self.run_command(Subcommand::Apply, &module.path).await?;
        if !result.success() {
            return Err(failure(Subcommand::Apply, &module.path, result));
        }
        Ok(ApplyResult {
            module: module.path.clone(),
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }

    async fn run_command(
        &self,
        subcommand: Subcommand,
        module: &ModulePath,
    ) -> IacResult<ExecutionResult> {
        let config = CommandConfig::new(&self.binary)
            .arg(format!("-chdir={}", module))
            .args(subcommand.args().iter().copied());

        debug!(command = %config.command_line(), "Executing terraform");

        let result = self.runner.run(&config, &self.run_config).await?;

        debug!(
            subcommand = %subcommand,
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            "Terraform finished"
        );
        Ok(result)
    }
}

fn failure(subcommand: Subcommand, module: &ModulePath, result: ExecutionResult) -> IacError {
    IacError::CommandFailed {
        subcommand,
        module: module.clone(),
        exit_code: result.exit_code,
        stdout: result.stdout,
        stderr: result.stderr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfgate_runner::{MockResponse, MockRunner};

    fn root(path: &str) -> Module {
        Module::new(path, vec![crate::model::File::new(format!("{path}/main.tf"))]).root()
    }

    fn terraform(mock: &MockRunner) -> TerraformRunner {
        TerraformRunner::new(Arc::new(mock.clone()))
            .with_binary("/usr/bin/terraform")
            .with_timeout(30)
    }

    #[tokio::test]
    async fn test_command_lines() {
        let mock = MockRunner::new();
        let tf = terraform(&mock);
        let module = root("/infra/roots/r1");

        tf.init(&module).await.unwrap();
        tf.plan(&module).await.unwrap();
        tf.apply(&module).await.unwrap();

        let calls = mock.get_calls();
        let lines: Vec<String> = calls
            .iter()
            .map(|c| format!("{} {}", c.program, c.args.join(" ")))
            .collect();
        assert_eq!(
            lines,
            vec![
                "/usr/bin/terraform -chdir=/infra/roots/r1 init -no-color",
                "/usr/bin/terraform -chdir=/infra/roots/r1 plan -no-color -detailed-exitcode",
                "/usr/bin/terraform -chdir=/infra/roots/r1 apply -no-color -auto-approve",
            ]
        );
        assert!(calls.iter().all(|c| c.timeout_seconds == 30));
    }

    #[tokio::test]
    async fn test_plan_exit_codes() {
        let mock = MockRunner::new().unframed().with_responses(vec![
            MockResponse::exit(0, "No changes."),
            MockResponse::exit(2, "Plan: 1 to add"),
            MockResponse::failure(1, "Error: invalid"),
        ]);
        let tf = terraform(&mock);
        let module = root("/infra/roots/r1");

        let clean = tf.plan(&module).await.unwrap();
        assert!(!clean.has_diff);
        assert_eq!(clean.to_string(), "out:\nNo changes.\nerr:\n");

        let diff = tf.plan(&module).await.unwrap();
        assert!(diff.has_diff);
        assert_eq!(diff.exit_code, 2);

        let err = tf.plan(&module).await.unwrap_err();
        assert!(matches!(
            err,
            IacError::CommandFailed {
                subcommand: Subcommand::Plan,
                exit_code: 1,
                ..
            }
        ));
        assert_eq!(err.transcript().unwrap(), "out:\n\nerr:\nError: invalid");
    }

    #[tokio::test]
    async fn test_init_and_apply_fail_on_any_non_zero() {
        let mock = MockRunner::new().add_response(MockResponse::exit(2, ""));
        let tf = terraform(&mock);
        let module = root("/infra/roots/r1");

        assert!(matches!(
            tf.init(&module).await,
            Err(IacError::CommandFailed {
                subcommand: Subcommand::Init,
                ..
            })
        ));
        assert!(matches!(
            tf.apply(&module).await,
            Err(IacError::CommandFailed {
                subcommand: Subcommand::Apply,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_runner_error_propagates() {
        let mock = MockRunner::new().simulate_failure("spawn failed");
        let tf = terraform(&mock);

        let err = tf.init(&root("/infra/roots/r1")).await.unwrap_err();
        assert!(matches!(err, IacError::Runner(_)));
        assert!(err.transcript().is_none());
    }
}
