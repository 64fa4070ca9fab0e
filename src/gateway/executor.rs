//! Shell execution behind a trait
//!
//! The gateway treats the shell as a black box: one command, one working
//! directory, one timeout, and a report of what came back. The system
//! implementation runs `sh -c` (or `cmd /C` on Windows) with piped
//! output and kills the child when the timeout elapses.

use crate::config::ExecutorConfig;
use crate::error::WardenError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Conventional shell exit status for a missing executable
#[cfg(unix)]
const NOT_FOUND_EXIT: i32 = 127;
#[cfg(windows)]
const NOT_FOUND_EXIT: i32 = 9009;

/// Captured output of one shell invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Process exit code (-1 when terminated by a signal)
    pub exit_code: i32,
}

impl ShellOutput {
    /// Whether the command exited successfully
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Black-box shell executor
///
/// The gateway is written against this trait; tests substitute scripted
/// implementations.
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    /// Run one command in a working directory under a timeout
    ///
    /// # Arguments
    ///
    /// * `command` - The raw command line, interpreted by the shell
    /// * `cwd` - Working directory for the child process
    /// * `timeout` - Wall-clock limit for the invocation
    ///
    /// # Errors
    ///
    /// Returns `WardenError::CommandTimedOut` when the limit elapses,
    /// `WardenError::ExecutableNotFound` when the command cannot be
    /// located, and other variants for spawn or collection failures.
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        timeout: Duration,
    ) -> std::result::Result<ShellOutput, WardenError>;
}

/// System shell executor: `sh -c` on Unix, `cmd /C` on Windows
#[derive(Debug, Clone, Default)]
pub struct SystemShell {
    /// Shell program override from configuration
    shell: Option<String>,
}

impl SystemShell {
    /// Create an executor from configuration
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            shell: config.shell.clone(),
        }
    }

    #[cfg(unix)]
    fn shell_invocation(&self, command: &str) -> Command {
        let program = self.shell.as_deref().unwrap_or("sh");
        let mut cmd = Command::new(program);
        cmd.arg("-c").arg(command);
        cmd
    }

    #[cfg(windows)]
    fn shell_invocation(&self, command: &str) -> Command {
        let program = self.shell.as_deref().unwrap_or("cmd");
        let mut cmd = Command::new(program);
        cmd.arg("/C").arg(command);
        cmd
    }
}

#[async_trait]
impl ShellExecutor for SystemShell {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        timeout: Duration,
    ) -> std::result::Result<ShellOutput, WardenError> {
        // A missing working directory also surfaces as NotFound from
        // spawn; check it first so that error keeps its own identity.
        if !cwd.is_dir() {
            return Err(WardenError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("working directory does not exist: {}", cwd.display()),
            )));
        }

        let mut cmd = self.shell_invocation(command);
        cmd.current_dir(cwd);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(command = %command, cwd = %cwd.display(), "Spawning shell command");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WardenError::ExecutableNotFound(first_token(command).to_string())
            } else {
                WardenError::Io(e)
            }
        })?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(WardenError::Execution(format!(
                    "failed to collect command output: {}",
                    e
                )))
            }
            Err(_) => {
                // Dropping the wait future drops the child handle; with
                // kill_on_drop set, the process is killed and reaped.
                tracing::warn!(command = %command, "Command exceeded timeout");
                return Err(WardenError::CommandTimedOut {
                    seconds: timeout.as_secs(),
                });
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        if exit_code == NOT_FOUND_EXIT {
            return Err(WardenError::ExecutableNotFound(
                first_token(command).to_string(),
            ));
        }

        Ok(ShellOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }
}

/// First whitespace token of a command, used in not-found reporting
pub(crate) fn first_token(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or(command)
}
