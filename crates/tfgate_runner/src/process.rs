//! Local process runner.
//!
//! Spawns the command directly on the host, captures stdout/stderr verbatim
//! and optionally mirrors both streams to this process while the child runs.

use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::config::{CommandConfig, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};
use crate::transcript;

/// Which of our own streams a child stream is mirrored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    fn write(self, bytes: &[u8]) {
        // Mirroring is best effort; a closed stdout must not fail the command.
        let _ = match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(bytes).and_then(|_| out.flush())
            }
            Self::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(bytes).and_then(|_| err.flush())
            }
        };
    }
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Runner that executes commands as local child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn build_command(config: &CommandConfig) -> Command {
        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }
}

/// Copy a child stream into a buffer, mirroring each chunk as it arrives.
async fn pump<R>(mut reader: R, mirror: Option<LogStream>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        captured.extend_from_slice(&chunk[..n]);
        if let Some(stream) = mirror {
            stream.write(&chunk[..n]);
        }
    }
    Ok(captured)
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        config: &CommandConfig,
        run_config: &RunConfig,
    ) -> RunnerResult<ExecutionResult> {
        let command_line = config.command_line();
        debug!("Executing: {}", command_line);

        let mirror_out = run_config.stream_logs.then_some(LogStream::Stdout);
        let mirror_err = run_config.stream_logs.then_some(LogStream::Stderr);

        let mut stdout_text = transcript::header(&command_line);
        if let Some(stream) = mirror_out {
            stream.write(stdout_text.as_bytes());
        }

        let started_at = Utc::now();
        let mut child = Self::build_command(config)
            .spawn()
            .map_err(|source| RunnerError::SpawnFailed {
                program: config.program.clone(),
                source,
            })?;

        let child_stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
        let child_stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

        let collect = async {
            let (out, err) = tokio::try_join!(
                pump(child_stdout, mirror_out),
                pump(child_stderr, mirror_err)
            )?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        };

        let waited = if run_config.timeout_seconds > 0 {
            tokio::time::timeout(Duration::from_secs(run_config.timeout_seconds), collect).await
        } else {
            Ok(collect.await)
        };

        let (status, out, err) = match waited {
            Ok(result) => result?,
            Err(_) => {
                let _ = child.start_kill();
                error!(
                    "{} did not finish within {}s",
                    command_line, run_config.timeout_seconds
                );
                return Err(RunnerError::Timeout(run_config.timeout_seconds));
            }
        };

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;
        let exit_code = status.code().unwrap_or(-1);

        stdout_text.push_str(&String::from_utf8_lossy(&out));
        let footer = transcript::footer(exit_code);
        if let Some(stream) = mirror_out {
            stream.write(footer.as_bytes());
        }
        stdout_text.push_str(&footer);

        info!(
            "{} exited with {} after {}ms",
            config.program, exit_code, duration_ms
        );

        Ok(ExecutionResult {
            command_line,
            exit_code,
            stdout: stdout_text,
            stderr: String::from_utf8_lossy(&err).into_owned(),
            started_at,
            finished_at,
            duration_ms,
        })
    }
}
