//! Error types for IaC module.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModulePath;
use crate::terraform::Subcommand;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur during IaC operations.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("{} does not exist", .0.display())]
    BaseDirNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{} is not under {}", path.display(), base.display())]
    NotUnderBase { path: PathBuf, base: PathBuf },

    #[error("terraform {subcommand} failed in {module} (exit code {exit_code})")]
    CommandFailed {
        subcommand: Subcommand,
        module: ModulePath,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Runner error: {0}")]
    Runner(#[from] tfgate_runner::RunnerError),
}

impl IacError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Transcript of a failed terraform command, in the same layout as a
    /// successful one, so it can still be reported.
    pub fn transcript(&self) -> Option<String> {
        match self {
            Self::CommandFailed { stdout, stderr, .. } => {
                Some(format!("out:\n{}\nerr:\n{}", stdout, stderr))
            }
            _ => None,
        }
    }
}
