//! Command gateway
//!
//! One entry point, `CommandGateway::execute`, runs every inbound command
//! through a fixed pipeline: sweep attempt, session resolution, rate
//! check, empty-command short circuit, policy classification, the `cd`
//! and clear-screen built-ins, and finally the shell executor. Built-ins
//! and rejected commands never reach the shell.

pub mod executor;

pub use executor::{ShellExecutor, ShellOutput, SystemShell};

use crate::config::Config;
use crate::error::WardenError;
use crate::metrics::CommandMetrics;
use crate::policy::CommandPolicy;
use crate::session::SessionManager;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Sentinel output instructing the client to clear its screen
pub const CLEAR_SCREEN_SENTINEL: &str = "CLEAR_SCREEN";

/// Prefix applied to every policy rejection. The suggestion filter keys
/// off this exact text, so the two must stay in sync.
pub const SECURITY_BLOCK_PREFIX: &str = "Command blocked for security reasons";

/// Advisory returned alongside rate-limit rejections
pub const RATE_LIMIT_MESSAGE: &str =
    "Rate limit exceeded. Please wait a moment before issuing more commands.";

/// Advisory returned for unknown or expired sessions
pub const INVALID_SESSION_MESSAGE: &str = "Invalid or expired session";

/// Substitute output for a successful command that printed nothing
pub const NO_OUTPUT_MESSAGE: &str = "Command executed successfully (no output)";

/// Result of handling one admitted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Combined stdout and stderr, or a built-in/advisory message
    pub output: String,

    /// Whether the command failed (non-zero exit, policy block, or error)
    pub failed: bool,

    /// Working directory after the command; only `cd` changes it
    pub cwd: PathBuf,
}

/// Successful pass through the gateway
#[derive(Debug, Clone)]
pub struct ExecuteOutcome {
    /// Session id in force, echoed so fresh clients learn theirs
    pub session_id: String,

    /// What the command produced
    pub result: InvocationResult,
}

/// Rejections that short-circuit the pipeline before any command handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayRejection {
    /// Unknown or expired session id
    InvalidSession,

    /// Session exhausted its rolling command budget
    RateLimited,
}

/// The command gateway
///
/// Owns the policy engine and a handle to the session manager and shell
/// executor. One instance serves all sessions.
///
/// # Examples
///
/// ```no_run
/// use termwarden::config::Config;
/// use termwarden::gateway::{CommandGateway, SystemShell};
/// use termwarden::policy::CommandPolicy;
/// use termwarden::session::{SessionManager, SessionStore};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let config = Config::default();
/// let sessions = Arc::new(SessionManager::new(
///     Arc::new(SessionStore::new()),
///     &config.session,
/// ));
/// let executor = Arc::new(SystemShell::new(&config.executor));
/// let gateway = CommandGateway::new(sessions, CommandPolicy::new(), executor, &config);
///
/// let outcome = gateway
///     .execute(None, "echo hello", Path::new("/tmp"))
///     .await
///     .unwrap();
/// assert!(!outcome.result.failed);
/// # });
/// ```
pub struct CommandGateway {
    sessions: Arc<SessionManager>,
    policy: CommandPolicy,
    executor: Arc<dyn ShellExecutor>,
    timeout: Duration,
    max_output_bytes: usize,
}

impl CommandGateway {
    /// Create a gateway from configuration
    pub fn new(
        sessions: Arc<SessionManager>,
        policy: CommandPolicy,
        executor: Arc<dyn ShellExecutor>,
        config: &Config,
    ) -> Self {
        Self {
            sessions,
            policy,
            executor,
            timeout: Duration::from_secs(config.executor.timeout_seconds),
            max_output_bytes: config.executor.max_output_bytes,
        }
    }

    /// Run one command through the full pipeline
    ///
    /// A missing or empty `session_id` mints a fresh session; a stale one
    /// is rejected. The returned outcome always carries the session id in
    /// force so clients can continue the conversation.
    ///
    /// # Errors
    ///
    /// Returns `GatewayRejection` for invalid sessions and exhausted rate
    /// windows. Everything else, including policy blocks and shell
    /// failures, is reported in-band through `InvocationResult`.
    pub async fn execute(
        &self,
        session_id: Option<&str>,
        command: &str,
        cwd: &Path,
    ) -> std::result::Result<ExecuteOutcome, GatewayRejection> {
        let metrics = CommandMetrics::new();
        self.sessions.maybe_sweep();

        let session_id = match session_id.filter(|id| !id.is_empty()) {
            None => self.sessions.create_session(),
            Some(id) => {
                if !self.sessions.validate_session(id) {
                    metrics.record_outcome("invalid_session");
                    return Err(GatewayRejection::InvalidSession);
                }
                id.to_string()
            }
        };

        // Rate accounting happens before the command is even parsed, so
        // empty commands spend budget too.
        if !self.sessions.check_rate(&session_id) {
            metrics.record_outcome("rate_limited");
            return Err(GatewayRejection::RateLimited);
        }
        self.sessions.note_command(&session_id);

        let trimmed = command.trim();
        if trimmed.is_empty() {
            metrics.record_outcome("empty");
            return Ok(ExecuteOutcome {
                session_id,
                result: InvocationResult {
                    output: String::new(),
                    failed: false,
                    cwd: cwd.to_path_buf(),
                },
            });
        }

        let verdict = self.policy.classify(command);
        if !verdict.allowed {
            let reason = verdict
                .reason
                .unwrap_or_else(|| "command not permitted".to_string());
            tracing::warn!(command = %trimmed, reason = %reason, "Command rejected by policy");
            metrics.record_outcome("policy_blocked");
            return Ok(ExecuteOutcome {
                session_id,
                result: InvocationResult {
                    output: format!("{}: {}", SECURITY_BLOCK_PREFIX, reason),
                    failed: true,
                    cwd: cwd.to_path_buf(),
                },
            });
        }

        let folded = trimmed.to_lowercase();

        if folded == "cd" || folded.starts_with("cd ") {
            let result = self.change_directory(trimmed, cwd);
            metrics.record_outcome("builtin_cd");
            return Ok(ExecuteOutcome { session_id, result });
        }

        if folded == "clear" || folded == "cls" {
            metrics.record_outcome("builtin_clear");
            return Ok(ExecuteOutcome {
                session_id,
                result: InvocationResult {
                    output: CLEAR_SCREEN_SENTINEL.to_string(),
                    failed: false,
                    cwd: cwd.to_path_buf(),
                },
            });
        }

        let result = match self.executor.run(trimmed, cwd, self.timeout).await {
            Ok(output) => {
                let failed = !output.success();
                metrics.record_outcome(if failed { "executed_failed" } else { "executed_ok" });
                InvocationResult {
                    output: self.combine_output(&output),
                    failed,
                    cwd: cwd.to_path_buf(),
                }
            }
            Err(WardenError::CommandTimedOut { seconds }) => {
                metrics.record_outcome("timeout");
                InvocationResult {
                    output: format!("Command timed out (exceeded {} seconds)", seconds),
                    failed: true,
                    cwd: cwd.to_path_buf(),
                }
            }
            Err(WardenError::ExecutableNotFound(verb)) => {
                metrics.record_outcome("not_found");
                InvocationResult {
                    output: format!(
                        "'{}' is not recognized as an internal or external command, \
                         operable program or batch file.",
                        verb
                    ),
                    failed: true,
                    cwd: cwd.to_path_buf(),
                }
            }
            Err(e) => {
                tracing::error!(command = %trimmed, error = %e, "Command execution failed");
                metrics.record_outcome("error");
                InvocationResult {
                    output: format!("Error executing command: {}", e),
                    failed: true,
                    cwd: cwd.to_path_buf(),
                }
            }
        };

        Ok(ExecuteOutcome { session_id, result })
    }

    /// Handle the `cd` built-in without touching the shell
    ///
    /// Bare `cd` and `cd ~` go home, `cd ..` goes to the parent (the root
    /// is its own parent), absolute arguments are taken as-is, and
    /// anything else is joined onto the current directory. The target is
    /// checked against the filesystem before the change is accepted.
    fn change_directory(&self, command: &str, cwd: &Path) -> InvocationResult {
        let arg = command[2..].trim();

        let target = if arg.is_empty() || arg == "~" {
            match home_dir() {
                Some(home) => home,
                None => {
                    return InvocationResult {
                        output: "The system cannot find the path specified: ~".to_string(),
                        failed: true,
                        cwd: cwd.to_path_buf(),
                    }
                }
            }
        } else if arg == ".." {
            cwd.parent().unwrap_or(cwd).to_path_buf()
        } else if Path::new(arg).is_absolute() {
            PathBuf::from(arg)
        } else {
            cwd.join(arg)
        };

        if target.is_dir() {
            let resolved = lexical_absolute_normalize(target);
            tracing::debug!(cwd = %resolved.display(), "Changed working directory");
            InvocationResult {
                output: format!("Changed directory to {}", resolved.display()),
                failed: false,
                cwd: resolved,
            }
        } else {
            InvocationResult {
                output: format!(
                    "The system cannot find the path specified: {}",
                    target.display()
                ),
                failed: true,
                cwd: cwd.to_path_buf(),
            }
        }
    }

    /// Combine captured streams into the reply body
    ///
    /// Stdout comes first, stderr is appended, oversized output is capped
    /// with a marker, and trailing newlines are stripped.
    fn combine_output(&self, output: &ShellOutput) -> String {
        let mut combined = String::with_capacity(output.stdout.len() + output.stderr.len());
        combined.push_str(&output.stdout);
        combined.push_str(&output.stderr);

        if combined.len() > self.max_output_bytes {
            let mut cut = self.max_output_bytes;
            while !combined.is_char_boundary(cut) {
                cut -= 1;
            }
            combined.truncate(cut);
            combined.push_str("\n[output truncated]");
        }

        let trimmed = combined.trim_end_matches(&['\n', '\r'][..]);
        if trimmed.is_empty() && output.success() {
            return NO_OUTPUT_MESSAGE.to_string();
        }
        trimmed.to_string()
    }
}

/// Resolve the user's home directory
fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

/// Lexically normalize a path: make it absolute, drop `.` components, and
/// resolve `..` without consulting the filesystem or following symlinks
fn lexical_absolute_normalize(mut path: PathBuf) -> PathBuf {
    if !path.is_absolute() {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        path = cwd.join(path);
    }

    let mut normalized = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push("/"),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(p) => normalized.push(p),
        }
    }
    normalized
}
