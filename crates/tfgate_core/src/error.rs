//! Error types for the core module.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Exit code for argument and input validation failures.
pub const EXIT_INVALID_ARGUMENT: i32 = 1;
/// Exit code when `terraform plan` reports pending changes.
pub const EXIT_PLAN_DIFF: i32 = 2;
/// Exit code when apply is refused because the pull request cannot be merged.
pub const EXIT_NOT_MERGEABLE: i32 = 3;
/// Exit code when the policy check found violations.
pub const EXIT_RULES_NOT_PASSED: i32 = 5;
/// Exit code when the policy check base directory is missing.
pub const EXIT_BASE_DIR_MISSING: i32 = 10;
/// Exit code for every failure without a dedicated code.
pub const EXIT_INTERNAL: i32 = 125;

/// An error carrying the process exit code it should terminate with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    pub exit_code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(exit_code: i32, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_ARGUMENT, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Errors that can occur during core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid event payload: {0}")]
    InvalidEvent(String),

    #[error("GitHub API {method} {url} returned {status}: {body}")]
    GithubApi {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Iac(#[from] tfgate_iac::IacError),

    #[error(transparent)]
    Policy(#[from] tfgate_policy::PolicyError),
}

impl CoreError {
    /// The dedicated exit code of this error, if it has one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Cli(err) => Some(err.exit_code),
            _ => None,
        }
    }
}
