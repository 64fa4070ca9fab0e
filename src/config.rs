//! Configuration management for Termwarden
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, WardenError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Main configuration structure for Termwarden
///
/// This structure holds all configuration needed for the gateway,
/// including the HTTP server, session lifecycle, shell executor, and
/// suggestion oracle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Session lifecycle and rate limiting configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Shell executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Suggestion oracle configuration
    #[serde(default)]
    pub oracle: OracleConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the listener to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the listener to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Default working directory for sessions that do not supply one
    ///
    /// When unset, the process working directory is used.
    #[serde(default)]
    pub workdir: Option<PathBuf>,

    /// Emit logs as JSON instead of human-readable lines
    #[serde(default)]
    pub json_logs: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workdir: None,
            json_logs: false,
        }
    }
}

/// Session lifecycle and rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum session lifetime in seconds, measured from creation
    #[serde(default = "default_session_lifetime")]
    pub max_lifetime_seconds: u64,

    /// Minimum interval between idle-session sweeps, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Maximum commands admitted per session in a rolling 60-second window
    #[serde(default = "default_rate_limit")]
    pub max_commands_per_minute: u32,
}

fn default_session_lifetime() -> u64 {
    7200
}

fn default_sweep_interval() -> u64 {
    1800
}

fn default_rate_limit() -> u32 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_lifetime_seconds: default_session_lifetime(),
            sweep_interval_seconds: default_sweep_interval(),
            max_commands_per_minute: default_rate_limit(),
        }
    }
}

/// Shell executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Timeout for a single command execution (seconds)
    #[serde(default = "default_command_timeout")]
    pub timeout_seconds: u64,

    /// Maximum combined stdout+stderr bytes returned to the client
    #[serde(default = "default_max_output")]
    pub max_output_bytes: usize,

    /// Shell program used to run commands
    ///
    /// Defaults to `sh` on Unix and `cmd` on Windows when unset.
    #[serde(default)]
    pub shell: Option<String>,
}

fn default_command_timeout() -> u64 {
    30
}

fn default_max_output() -> usize {
    1_048_576
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_command_timeout(),
            max_output_bytes: default_max_output(),
            shell: None,
        }
    }
}

/// Suggestion oracle configuration
///
/// The oracle is an OpenAI-compatible chat-completions endpoint. The
/// defaults target the Groq API with a small, fast model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the chat-completions API
    #[serde(default = "default_oracle_api_base")]
    pub api_base: String,

    /// Model identifier sent with every request
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// Maximum tokens requested per suggestion
    #[serde(default = "default_oracle_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_oracle_temperature")]
    pub temperature: f32,

    /// Request timeout (seconds)
    #[serde(default = "default_oracle_timeout")]
    pub timeout_seconds: u64,

    /// API key; normally supplied via the GROQ_API_KEY environment variable
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_oracle_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_oracle_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_oracle_max_tokens() -> u32 {
    150
}

fn default_oracle_temperature() -> f32 {
    0.1
}

fn default_oracle_timeout() -> u64 {
    30
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_base: default_oracle_api_base(),
            model: default_oracle_model(),
            max_tokens: default_oracle_max_tokens(),
            temperature: default_oracle_temperature(),
            timeout_seconds: default_oracle_timeout(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            executor: ExecutorConfig::default(),
            oracle: OracleConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WardenError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| WardenError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Server overrides
        if let Ok(host) = std::env::var("TERMWARDEN_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("TERMWARDEN_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid TERMWARDEN_PORT: {}", port);
            }
        }

        if let Ok(workdir) = std::env::var("TERMWARDEN_WORKDIR") {
            self.server.workdir = Some(PathBuf::from(workdir));
        }

        if let Ok(json_logs) = std::env::var("TERMWARDEN_JSON_LOGS") {
            match json_logs.parse::<bool>() {
                Ok(v) => self.server.json_logs = v,
                Err(_) => {
                    tracing::warn!("Invalid value for TERMWARDEN_JSON_LOGS: {}", json_logs);
                }
            }
        }

        // Session overrides
        if let Ok(lifetime) = std::env::var("TERMWARDEN_SESSION_LIFETIME") {
            if let Ok(value) = lifetime.parse() {
                self.session.max_lifetime_seconds = value;
            } else {
                tracing::warn!("Invalid TERMWARDEN_SESSION_LIFETIME: {}", lifetime);
            }
        }

        if let Ok(interval) = std::env::var("TERMWARDEN_SWEEP_INTERVAL") {
            if let Ok(value) = interval.parse() {
                self.session.sweep_interval_seconds = value;
            } else {
                tracing::warn!("Invalid TERMWARDEN_SWEEP_INTERVAL: {}", interval);
            }
        }

        if let Ok(limit) = std::env::var("TERMWARDEN_RATE_LIMIT") {
            if let Ok(value) = limit.parse() {
                self.session.max_commands_per_minute = value;
            } else {
                tracing::warn!("Invalid TERMWARDEN_RATE_LIMIT: {}", limit);
            }
        }

        // Executor overrides
        if let Ok(timeout) = std::env::var("TERMWARDEN_COMMAND_TIMEOUT") {
            if let Ok(value) = timeout.parse() {
                self.executor.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid TERMWARDEN_COMMAND_TIMEOUT: {}", timeout);
            }
        }

        // Oracle overrides
        if let Ok(api_base) = std::env::var("TERMWARDEN_ORACLE_API_BASE") {
            self.oracle.api_base = api_base;
        }

        if let Ok(model) = std::env::var("TERMWARDEN_ORACLE_MODEL") {
            self.oracle.model = model;
        }

        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.is_empty() {
                self.oracle.api_key = Some(key);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let crate::cli::Commands::Serve {
            ref host,
            port,
            ref workdir,
        } = cli.command
        {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = port;
            }
            if let Some(workdir) = workdir {
                self.server.workdir = Some(workdir.clone());
            }
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(WardenError::Config("server.host cannot be empty".to_string()).into());
        }

        if self.server.port == 0 {
            return Err(
                WardenError::Config("server.port must be greater than 0".to_string()).into(),
            );
        }

        if self.session.max_lifetime_seconds == 0 {
            return Err(WardenError::Config(
                "session.max_lifetime_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.sweep_interval_seconds == 0 {
            return Err(WardenError::Config(
                "session.sweep_interval_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.max_commands_per_minute == 0 {
            return Err(WardenError::Config(
                "session.max_commands_per_minute must be greater than 0".to_string(),
            )
            .into());
        }

        if self.executor.timeout_seconds == 0 {
            return Err(WardenError::Config(
                "executor.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.executor.max_output_bytes == 0 {
            return Err(WardenError::Config(
                "executor.max_output_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        if self.oracle.max_tokens == 0 {
            return Err(WardenError::Config(
                "oracle.max_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            return Err(WardenError::Config(
                "oracle.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if Url::parse(&self.oracle.api_base).is_err() {
            return Err(WardenError::Config(format!(
                "oracle.api_base is not a valid URL: {}",
                self.oracle.api_base
            ))
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
