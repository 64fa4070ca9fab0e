//! Output analysis and command suggestions
//!
//! `SuggestionService` wraps the oracle with the filter: gate, truncate,
//! call, audit. Every path yields a usable string; no oracle fault
//! escapes as an error.

pub mod filter;
pub mod oracle;

pub use filter::{ReplyAudit, SuggestionFilter, MAX_ORACLE_INPUT_CHARS, SUGGESTION_REFUSAL};
pub use oracle::{mask_api_key, GroqOracle, SuggestionOracle};

use crate::error::WardenError;
use crate::metrics::record_suggestion;
use std::sync::Arc;

/// Guidance shown when no credential is configured
const NO_CREDENTIALS_GUIDANCE: &str =
    "Error: no Groq API key is configured. Set GROQ_API_KEY and restart the server.";

/// Guidance for an unreachable upstream
const UPSTREAM_GUIDANCE: &str = "Groq API is currently unavailable. This might be due to:\n\
     - Invalid API key\n\
     - Service outage\n\
     - Rate limit exceeded\n\n\
     Please check your API key and try again later.";

/// Guidance for an authentication failure
const AUTH_GUIDANCE: &str =
    "Authentication failed. Please check if your Groq API key is valid and properly set.";

/// Guidance for upstream rate limiting
const RATE_GUIDANCE: &str = "Rate limit exceeded. Please wait a moment before trying again.";

/// Guidance for a timed-out oracle call
const TIMEOUT_GUIDANCE: &str = "Request timed out. The Groq API might be slow. Please try again.";

/// Suggestion pipeline: gate, truncate, ask, audit
///
/// # Examples
///
/// ```no_run
/// use termwarden::config::OracleConfig;
/// use termwarden::suggest::{GroqOracle, SuggestionService};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let oracle = Arc::new(GroqOracle::new(&OracleConfig::default()).unwrap());
/// let service = SuggestionService::new(oracle);
///
/// let suggestion = service.analyze("ls: cannot access 'nope'").await;
/// assert!(!suggestion.is_empty());
/// # });
/// ```
pub struct SuggestionService {
    oracle: Arc<dyn SuggestionOracle>,
    filter: SuggestionFilter,
}

impl SuggestionService {
    /// Create a service around an oracle
    pub fn new(oracle: Arc<dyn SuggestionOracle>) -> Self {
        Self {
            oracle,
            filter: SuggestionFilter,
        }
    }

    /// Analyze terminal output and produce a suggestion
    ///
    /// Output carrying a gateway rejection never reaches the oracle, and
    /// an oracle reply that discusses bypassing a security block is
    /// replaced with the fixed refusal. Oracle faults map to guidance
    /// strings, so the returned text is always presentable.
    pub async fn analyze(&self, output: &str) -> String {
        if self.filter.is_blocked_output(output) {
            tracing::info!("Refusing to analyze security-rejected output");
            record_suggestion("gated");
            return SUGGESTION_REFUSAL.to_string();
        }

        let bounded = self.filter.truncate_for_oracle(output);

        match self.oracle.suggest(bounded).await {
            Ok(reply) => match self.filter.audit_reply(&reply) {
                ReplyAudit::Clear => {
                    record_suggestion("clear");
                    reply
                }
                ReplyAudit::Suspicious => {
                    tracing::warn!("Oracle reply touches restricted topics; passing through");
                    record_suggestion("suspicious");
                    reply
                }
                ReplyAudit::BlockedTopic => {
                    tracing::warn!("Oracle reply discarded: suggests bypassing a security block");
                    record_suggestion("blocked_topic");
                    SUGGESTION_REFUSAL.to_string()
                }
            },
            Err(e) => {
                tracing::error!("Suggestion oracle call failed: {}", e);
                record_suggestion("error");
                classify_oracle_failure(&e)
            }
        }
    }
}

/// Map an oracle failure onto user-facing guidance
///
/// Matches the failure text against known upstream patterns; the order
/// of checks is significant, the first match wins.
fn classify_oracle_failure(error: &WardenError) -> String {
    if matches!(error, WardenError::MissingCredentials(_)) {
        return NO_CREDENTIALS_GUIDANCE.to_string();
    }

    let message = error.to_string().to_lowercase();
    if message.contains("no healthy upstream") {
        UPSTREAM_GUIDANCE.to_string()
    } else if message.contains("unauthorized") || message.contains("401") {
        AUTH_GUIDANCE.to_string()
    } else if message.contains("rate limit") || message.contains("429") {
        RATE_GUIDANCE.to_string()
    } else if message.contains("timeout") || message.contains("timed out") {
        TIMEOUT_GUIDANCE.to_string()
    } else {
        format!(
            "Error getting AI suggestion: {}\n\nPlease check your internet connection and API key.",
            error
        )
    }
}
