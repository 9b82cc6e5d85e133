//! Gateway configuration.
//!
//! Values are resolved by the command line layer (flags with environment
//! fallbacks) and handed to the gateways as one struct.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tfgate_iac::TerraformRunner;
use tfgate_runner::CommandRunner;

pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Configuration for the provisioning binary and the GitHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Provisioning binary, a path or a name looked up in `PATH`
    pub terraform_bin: String,
    /// Kill provisioning commands after this many seconds (0 = never)
    pub command_timeout_secs: u64,
    /// API base URL without trailing slash
    pub github_api_url: String,
    /// Bearer token for the API
    #[serde(skip_serializing)]
    pub github_token: Option<String>,
    /// Sent as `E2E-TestId` so fake API servers can tell runs apart
    pub e2e_test_id: Option<String>,
    /// How often to ask for mergeability while GitHub is still computing it
    pub mergeable_poll_attempts: u32,
    /// Delay between mergeability polls
    pub mergeable_poll_interval_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            terraform_bin: DEFAULT_TERRAFORM_BIN.to_string(),
            command_timeout_secs: 0,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
            e2e_test_id: None,
            mergeable_poll_attempts: 5,
            mergeable_poll_interval_secs: 2,
        }
    }
}

impl GatewayConfig {
    pub fn with_terraform_bin(mut self, bin: impl Into<String>) -> Self {
        self.terraform_bin = bin.into();
        self
    }

    pub fn with_command_timeout(mut self, seconds: u64) -> Self {
        self.command_timeout_secs = seconds;
        self
    }

    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_e2e_test_id(mut self, id: Option<String>) -> Self {
        self.e2e_test_id = id.filter(|t| !t.is_empty());
        self
    }

    pub fn with_mergeable_polling(mut self, attempts: u32, interval_secs: u64) -> Self {
        self.mergeable_poll_attempts = attempts.max(1);
        self.mergeable_poll_interval_secs = interval_secs;
        self
    }

    pub fn mergeable_poll_interval(&self) -> Duration {
        Duration::from_secs(self.mergeable_poll_interval_secs)
    }

    /// Terraform gateway over `runner` using the configured binary and timeout.
    pub fn terraform_runner(&self, runner: Arc<dyn CommandRunner>) -> TerraformRunner {
        TerraformRunner::new(runner)
            .with_binary(&self.terraform_bin)
            .with_timeout(self.command_timeout_secs)
    }
}
