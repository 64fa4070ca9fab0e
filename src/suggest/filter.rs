//! Guard rails around the suggestion oracle
//!
//! The filter runs on both sides of an oracle call: a gate that refuses
//! to analyze output the gateway itself rejected, and an audit that
//! discards replies steering the user around a security block. The audit
//! is keyword-based and best-effort, not a guarantee.

use crate::gateway::{INVALID_SESSION_MESSAGE, RATE_LIMIT_MESSAGE, SECURITY_BLOCK_PREFIX};

/// Fixed refusal returned when the gate or the audit fires
pub const SUGGESTION_REFUSAL: &str =
    "This command was blocked by the security policy. No alternative commands or \
     workarounds can be suggested for blocked operations.";

/// Longest prefix of terminal output forwarded to the oracle
pub const MAX_ORACLE_INPUT_CHARS: usize = 300;

/// Substrings marking output the gateway already rejected
const BLOCK_INDICATORS: &[&str] = &[
    SECURITY_BLOCK_PREFIX,
    RATE_LIMIT_MESSAGE,
    INVALID_SESSION_MESSAGE,
];

/// Phrases that read as a way around a restriction
const BYPASS_TERMS: &[&str] = &[
    "workaround",
    "work-around",
    "bypass",
    "circumvent",
    "instead try",
    "get around",
    "sidestep",
    "side-step",
    "alternative way",
];

/// Terms indicating the reply is discussing the security layer
const SECURITY_TERMS: &[&str] = &[
    "security",
    "restrict",
    "blocked",
    "policy",
    "forbidden",
    "permission",
];

/// Outcome of auditing one oracle reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAudit {
    /// No flagged terms at all
    Clear,

    /// One keyword class present; the reply passes but is logged
    Suspicious,

    /// Bypass and security terms co-occur; the reply is discarded
    BlockedTopic,
}

/// Stateless filter applied around every oracle call
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionFilter;

impl SuggestionFilter {
    /// Whether the submitted output carries a gateway rejection
    ///
    /// Blocked output never reaches the oracle; the caller substitutes
    /// the fixed refusal instead.
    pub fn is_blocked_output(&self, output: &str) -> bool {
        BLOCK_INDICATORS
            .iter()
            .any(|indicator| output.contains(indicator))
    }

    /// Bound the output forwarded to the oracle
    ///
    /// Cuts at a character boundary, so multi-byte output never splits
    /// mid-character.
    pub fn truncate_for_oracle<'a>(&self, output: &'a str) -> &'a str {
        match output.char_indices().nth(MAX_ORACLE_INPUT_CHARS) {
            Some((idx, _)) => &output[..idx],
            None => output,
        }
    }

    /// Audit an oracle reply for bypass advice
    pub fn audit_reply(&self, reply: &str) -> ReplyAudit {
        let folded = reply.to_lowercase();
        let bypass = BYPASS_TERMS.iter().any(|term| folded.contains(term));
        let security = SECURITY_TERMS.iter().any(|term| folded.contains(term));

        match (bypass, security) {
            (true, true) => ReplyAudit::BlockedTopic,
            (false, false) => ReplyAudit::Clear,
            _ => ReplyAudit::Suspicious,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_detects_policy_block() {
        let filter = SuggestionFilter;
        let output = "Command blocked for security reasons: use of 'rm' is not permitted";
        assert!(filter.is_blocked_output(output));
    }

    #[test]
    fn test_gate_detects_rate_limit_advisory() {
        let filter = SuggestionFilter;
        assert!(filter.is_blocked_output(RATE_LIMIT_MESSAGE));
    }

    #[test]
    fn test_gate_detects_invalid_session_message() {
        let filter = SuggestionFilter;
        let output = format!("server said: {}", INVALID_SESSION_MESSAGE);
        assert!(filter.is_blocked_output(&output));
    }

    #[test]
    fn test_gate_passes_ordinary_errors() {
        let filter = SuggestionFilter;
        assert!(!filter.is_blocked_output("ls: cannot access 'nope': No such file"));
        assert!(!filter.is_blocked_output(""));
    }

    #[test]
    fn test_truncate_short_output_untouched() {
        let filter = SuggestionFilter;
        assert_eq!(filter.truncate_for_oracle("short output"), "short output");
    }

    #[test]
    fn test_truncate_caps_at_limit() {
        let filter = SuggestionFilter;
        let long = "x".repeat(500);
        let bounded = filter.truncate_for_oracle(&long);
        assert_eq!(bounded.chars().count(), MAX_ORACLE_INPUT_CHARS);
    }

    #[test]
    fn test_truncate_exact_limit_untouched() {
        let filter = SuggestionFilter;
        let exact = "y".repeat(MAX_ORACLE_INPUT_CHARS);
        assert_eq!(filter.truncate_for_oracle(&exact), exact);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let filter = SuggestionFilter;
        let long = "é".repeat(400);
        let bounded = filter.truncate_for_oracle(&long);
        assert_eq!(bounded.chars().count(), MAX_ORACLE_INPUT_CHARS);
    }

    #[test]
    fn test_audit_clear_reply() {
        let filter = SuggestionFilter;
        assert_eq!(
            filter.audit_reply("Try `ls -la` to list hidden files."),
            ReplyAudit::Clear
        );
    }

    #[test]
    fn test_audit_flags_bypass_of_security_block() {
        let filter = SuggestionFilter;
        let reply = "As a workaround for the security block, try copying the file first.";
        assert_eq!(filter.audit_reply(reply), ReplyAudit::BlockedTopic);
    }

    #[test]
    fn test_audit_is_case_insensitive() {
        let filter = SuggestionFilter;
        let reply = "You could BYPASS the SECURITY check entirely.";
        assert_eq!(filter.audit_reply(reply), ReplyAudit::BlockedTopic);
    }

    #[test]
    fn test_audit_single_class_is_suspicious() {
        let filter = SuggestionFilter;
        assert_eq!(
            filter.audit_reply("Check the file permissions with `ls -l`."),
            ReplyAudit::Suspicious
        );
        assert_eq!(
            filter.audit_reply("Instead try running the command with -v."),
            ReplyAudit::Suspicious
        );
    }
}
