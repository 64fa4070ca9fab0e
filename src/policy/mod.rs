//! Command policy engine
//!
//! An ordered blocklist evaluated fresh on every command. Rules run in
//! declaration order and the first match wins; commands matching no rule
//! pass. This is deliberately a blocklist, not an allowlist: unknown
//! commands are allowed and the rule tables name what is forbidden.

pub mod rules;

pub use rules::{default_rules, PolicyRule, BLOCKED_VERBS, DANGEROUS_OPERATORS};

/// Outcome of classifying one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the command may proceed
    pub allowed: bool,

    /// Human-readable reason when not allowed
    pub reason: Option<String>,
}

impl Verdict {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn block(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// The policy engine: an ordered list of pure predicate rules
#[derive(Debug)]
pub struct CommandPolicy {
    rules: Vec<PolicyRule>,
}

impl CommandPolicy {
    /// Create the engine with the default rule table
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Create the engine with a custom ordered rule list
    pub fn with_rules(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    /// Classify a command against the rule table
    ///
    /// Every call evaluates the full table from scratch; verdicts are
    /// never cached.
    ///
    /// # Arguments
    ///
    /// * `command` - The command as received from the client
    ///
    /// # Returns
    ///
    /// Returns the verdict, carrying the first matching rule's reason
    /// when blocked
    pub fn classify(&self, command: &str) -> Verdict {
        let folded = command.trim().to_lowercase();

        for rule in &self.rules {
            if let Some(reason) = rule.evaluate(&folded, command) {
                crate::metrics::record_policy_block(rule.class());
                tracing::warn!(
                    command = %command,
                    reason = %reason,
                    "Command blocked by policy"
                );
                return Verdict::block(reason);
            }
        }

        tracing::debug!(command = %command, "Command passed policy");
        Verdict::allow()
    }
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self::new()
    }
}
