//! Scripted command runner for tests.
//!
//! [`MockRunner`] never spawns a process. Responses come from a script:
//! routes keyed by an argument (`"plan"`, `"apply"`) answer matching calls,
//! everything else is served from a default queue that cycles.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::config::{CommandConfig, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};
use crate::transcript;

/// What a scripted command prints and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::exit(0, stdout)
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Exit with an arbitrary code, including non-failure codes such as 2.
    pub fn exit(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// A command the mock was asked to run.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_seconds: u64,
}

impl CapturedCall {
    /// Whether any argument equals `arg`.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

#[derive(Debug, Default)]
struct Script {
    /// Consumed in order; the last entry of a route repeats.
    routes: Vec<(String, VecDeque<MockResponse>)>,
    defaults: Vec<MockResponse>,
    next_default: usize,
    spawn_error: Option<String>,
    calls: Vec<CapturedCall>,
}

impl Script {
    fn respond(&mut self, call: &CapturedCall) -> MockResponse {
        if let Some((_, queue)) = self.routes.iter_mut().find(|(arg, _)| call.has_arg(arg)) {
            let response = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(response) = response {
                return response;
            }
        }

        if self.defaults.is_empty() {
            return MockResponse::success("");
        }
        let response = self.defaults[self.next_default % self.defaults.len()].clone();
        self.next_default += 1;
        response
    }
}

/// Command runner that replays a script and records every call.
///
/// Clones share the same script, so a test can hand one clone to the code
/// under test and inspect calls through another. Stdout is framed like a
/// real run unless [`MockRunner::unframed`] is used.
#[derive(Clone)]
pub struct MockRunner {
    script: Arc<Mutex<Script>>,
    framed: bool,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Every call succeeds with empty output.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            framed: true,
        }
    }

    /// Append to the default queue.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.script.lock().defaults.push(response);
        self
    }

    /// Replace the default queue.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        self.script.lock().defaults = responses;
        self
    }

    /// Answer calls carrying `arg` from their own queue.
    ///
    /// Routes are matched in the order they were added.
    pub fn on_arg(self, arg: impl Into<String>, responses: Vec<MockResponse>) -> Self {
        self.script
            .lock()
            .routes
            .push((arg.into(), responses.into_iter().collect()));
        self
    }

    /// Fail every call as if the program could not be started.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        self.script.lock().spawn_error = Some(message.into());
        self
    }

    /// Return scripted stdout as-is, without banners.
    pub fn unframed(mut self) -> Self {
        self.framed = false;
        self
    }

    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.script.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().calls.len()
    }

    /// Calls whose arguments contain `arg`, e.g. a subcommand name.
    pub fn calls_with_arg(&self, arg: &str) -> Vec<CapturedCall> {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.has_arg(arg))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        config: &CommandConfig,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let call = CapturedCall {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout_seconds: run_config.timeout_seconds,
        };

        let response = {
            let mut script = self.script.lock();
            script.calls.push(call.clone());
            if let Some(message) = script.spawn_error.clone() {
                return Err(RunnerError::ExecutionFailed(message));
            }
            script.respond(&call)
        };

        let command_line = config.command_line();
        let stdout = if self.framed {
            transcript::frame(&command_line, &response.stdout, response.exit_code)
        } else {
            response.stdout
        };
        let now = Utc::now();

        Ok(ExecutionResult {
            command_line,
            exit_code: response.exit_code,
            stdout,
            stderr: response.stderr,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        })
    }
}
