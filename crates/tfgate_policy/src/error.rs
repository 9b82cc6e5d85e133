//! Error types for policy module.

use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur while checking rules.
///
/// Violations are not errors; they are returned as data.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error(transparent)]
    Iac(#[from] tfgate_iac::IacError),
}
