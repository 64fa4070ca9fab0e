use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use termwarden::config::Config;
use termwarden::error::WardenError;
use termwarden::gateway::{CommandGateway, ShellExecutor, ShellOutput};
use termwarden::policy::CommandPolicy;
use termwarden::server::AppState;
use termwarden::session::{SessionManager, SessionStore};
use termwarden::suggest::{GroqOracle, SuggestionService};

/// Scripted executor replaying canned responses and recording calls
pub struct ScriptedShell {
    responses: Mutex<VecDeque<Result<ShellOutput, WardenError>>>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl ScriptedShell {
    pub fn new(responses: Vec<Result<ShellOutput, WardenError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShellExecutor for ScriptedShell {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        _timeout: Duration,
    ) -> Result<ShellOutput, WardenError> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), cwd.to_path_buf()));
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ShellOutput {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: 0,
            })
        })
    }
}

#[allow(dead_code)]
pub fn ok_output(stdout: &str) -> Result<ShellOutput, WardenError> {
    Ok(ShellOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: 0,
    })
}

/// Build full app state over a scripted shell, no oracle credentials
#[allow(dead_code)]
pub fn scripted_state(
    responses: Vec<Result<ShellOutput, WardenError>>,
    config: Config,
) -> (Arc<AppState>, Arc<ScriptedShell>) {
    let shell = Arc::new(ScriptedShell::new(responses));
    let sessions = Arc::new(SessionManager::new(
        Arc::new(SessionStore::new()),
        &config.session,
    ));
    let gateway = CommandGateway::new(
        sessions.clone(),
        CommandPolicy::new(),
        shell.clone(),
        &config,
    );
    let oracle = Arc::new(GroqOracle::new(&config.oracle).expect("failed to build oracle"));
    let advisor = SuggestionService::new(oracle);

    let state = Arc::new(AppState {
        gateway,
        advisor,
        sessions,
        default_cwd: std::env::temp_dir(),
        started_at: std::time::Instant::now(),
        started_utc: chrono::Utc::now(),
    });
    (state, shell)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
