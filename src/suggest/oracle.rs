//! Chat-completion client for command suggestions
//!
//! Speaks the OpenAI-compatible protocol against the Groq API. The
//! request shape is fixed: one system instruction, one user message
//! carrying the bounded terminal output.

use crate::config::OracleConfig;
use crate::error::{Result, WardenError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed system instruction sent with every suggestion request
const SYSTEM_PROMPT: &str = "You are a helpful terminal assistant. Analyze the terminal \
     output and suggest the correct command or fix. Keep your response concise and \
     actionable. Never suggest workarounds or alternatives for commands that were \
     blocked by security policy.";

/// Suggestion oracle
///
/// The service layer is written against this trait; tests substitute
/// canned implementations.
#[async_trait]
pub trait SuggestionOracle: Send + Sync {
    /// Produce a suggestion for a bounded slice of terminal output
    ///
    /// # Errors
    ///
    /// Returns `WardenError::MissingCredentials` when no API key is
    /// configured and `WardenError::Oracle` for transport or protocol
    /// failures.
    async fn suggest(&self, output: &str) -> std::result::Result<String, WardenError>;
}

/// Groq-backed oracle
pub struct GroqOracle {
    client: Client,
    api_base: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
}

/// Request structure for the chat-completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// One chat message in OpenAI format
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

/// Response structure from the chat-completions endpoint
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl GroqOracle {
    /// Create a new oracle from configuration
    ///
    /// A missing API key is not an error here; it surfaces per request so
    /// the server still starts and serves commands without suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails.
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("termwarden/0.2.0")
            .build()
            .map_err(|e| WardenError::Oracle(format!("Failed to create HTTP client: {}", e)))?;

        match &config.api_key {
            Some(key) => {
                tracing::info!(key = %mask_api_key(key), model = %config.model, "Groq API key loaded")
            }
            None => {
                tracing::warn!("No Groq API key configured; suggestion requests will report it")
            }
        }

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl SuggestionOracle for GroqOracle {
    async fn suggest(&self, output: &str) -> std::result::Result<String, WardenError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| WardenError::MissingCredentials("Groq".to_string()))?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Terminal output: {}\nSuggest the correct command or fix:",
                        output
                    ),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!(model = %self.model, "Sending suggestion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Groq request failed: {}", e);
                if e.is_timeout() {
                    WardenError::Oracle("request timed out".to_string())
                } else {
                    WardenError::Oracle(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Groq returned error {}: {}", status, error_text);
            return Err(WardenError::Oracle(format!(
                "Groq returned error {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Groq response: {}", e);
            WardenError::Oracle(format!("Failed to parse response: {}", e))
        })?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| WardenError::Oracle("No choices in response".to_string()))?;

        Ok(choice.message.content.trim().to_string())
    }
}

/// Mask a credential for logging
///
/// Keeps the first eight and last four characters of a long key; short
/// keys are fully hidden.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_api_key_long() {
        assert_eq!(
            mask_api_key("gsk_0123456789abcdefghij"),
            "gsk_0123...ghij"
        );
    }

    #[test]
    fn test_mask_api_key_short() {
        assert_eq!(mask_api_key("tiny"), "***");
        assert_eq!(mask_api_key(""), "***");
    }

    #[test]
    fn test_mask_api_key_boundary() {
        assert_eq!(mask_api_key("123456789012"), "***");
        assert_eq!(mask_api_key("1234567890123"), "12345678...0123");
    }

    #[test]
    fn test_new_without_key_succeeds() {
        let config = OracleConfig::default();
        assert!(config.api_key.is_none());
        assert!(GroqOracle::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_suggest_without_key_is_missing_credentials() {
        let oracle = GroqOracle::new(&OracleConfig::default()).unwrap();
        let err = oracle.suggest("ls: command output").await.unwrap_err();
        assert!(matches!(err, WardenError::MissingCredentials(_)));
    }
}
