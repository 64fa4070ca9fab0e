//! Error types for Termwarden
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Termwarden operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, shell execution, session handling, and
/// suggestion-oracle interactions.
#[derive(Error, Debug)]
pub enum WardenError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Suggestion oracle errors (API calls, malformed replies, etc.)
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Missing credentials for the suggestion oracle
    #[error("Missing credentials for {0}")]
    MissingCredentials(String),

    /// A shell command exceeded its execution timeout
    #[error("Command timed out after {seconds} seconds")]
    CommandTimedOut {
        /// The configured timeout that was exceeded
        seconds: u64,
    },

    /// The command's executable could not be located
    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    /// Shell execution failed before producing an exit status
    #[error("Execution error: {0}")]
    Execution(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Termwarden operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = WardenError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_oracle_error_display() {
        let error = WardenError::Oracle("API timeout".to_string());
        assert_eq!(error.to_string(), "Oracle error: API timeout");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = WardenError::MissingCredentials("groq".to_string());
        assert_eq!(error.to_string(), "Missing credentials for groq");
    }

    #[test]
    fn test_command_timed_out_display() {
        let error = WardenError::CommandTimedOut { seconds: 30 };
        assert_eq!(error.to_string(), "Command timed out after 30 seconds");
    }

    #[test]
    fn test_executable_not_found_display() {
        let error = WardenError::ExecutableNotFound("frobnicate".to_string());
        assert_eq!(error.to_string(), "Executable not found: frobnicate");
    }

    #[test]
    fn test_execution_error_display() {
        let error = WardenError::Execution("broken pipe".to_string());
        assert_eq!(error.to_string(), "Execution error: broken pipe");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: WardenError = io_error.into();
        assert!(matches!(error, WardenError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: WardenError = json_error.into();
        assert!(matches!(error, WardenError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: WardenError = yaml_error.into();
        assert!(matches!(error, WardenError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WardenError>();
    }
}
