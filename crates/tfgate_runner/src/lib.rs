//! # tfgate_runner
//!
//! External command execution wrapper for tfgate.
//!
//! Every provisioning-tool invocation goes through a [`CommandRunner`]. The
//! [`ProcessRunner`] spawns local processes, captures stdout/stderr verbatim,
//! mirrors them to this process framed by delimiter banners, and enforces an
//! optional timeout. The [`MockRunner`] replays scripted responses in tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use tfgate_runner::{CommandConfig, CommandRunner, ProcessRunner, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ProcessRunner::new();
//!
//!     let config = CommandConfig::new("terraform")
//!         .arg("-chdir=/infra/roots/app")
//!         .args(["plan", "-no-color", "-detailed-exitcode"]);
//!
//!     let result = runner.run(&config, &RunConfig::default().timeout(600)).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mock;
pub mod process;
pub mod runner;
pub mod transcript;

pub use config::{CommandConfig, RunConfig};
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use process::{LogStream, ProcessRunner};
pub use runner::{CommandRunner, ExecutionResult};
