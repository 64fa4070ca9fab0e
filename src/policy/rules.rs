//! Blocklist rule tables and predicates
//!
//! Three rule classes, each a pure predicate over the command text:
//! blocked verbs matched as prefixes of the trimmed lower-cased command,
//! sensitive path patterns matched case-insensitively anywhere, and
//! shell operators matched as raw substrings. The engine in the parent
//! module walks an ordered table of these rules.
//!
//! Verb matching is deliberately blunt: `shutdown` trips the `sh` entry
//! and `catalog` trips `cat`. Conservative over permissive.

use regex::Regex;

/// Verbs blocked as command prefixes, grouped by category
pub const BLOCKED_VERBS: &[&str] = &[
    // Destructive filesystem operations
    "rm", "del", "rmdir", "rd",
    // Disk and filesystem tooling
    "format", "mkfs", "fdisk", "diskpart", "dd",
    // File-reading utilities
    "cat", "type", "more", "less", "head", "tail",
    // Network transfer tools
    "curl", "wget", "scp", "ftp",
    // Privilege and user management
    "sudo", "su", "runas", "net", "useradd", "userdel",
    // Registry tools
    "reg", "regedit",
    // Nested shells
    "powershell", "pwsh", "cmd", "bash", "sh", "zsh", "fish",
];

/// Case-insensitive patterns for sensitive paths and files, with the
/// label reported in the block reason
const SENSITIVE_PATH_PATTERNS: &[(&str, &str)] = &[
    // OS-critical directories
    (r"(?i)/etc/", "/etc/"),
    (r"(?i)/boot/", "/boot/"),
    (r"(?i)/proc/", "/proc/"),
    (r"(?i)/sys/", "/sys/"),
    (r"(?i)c:\\windows", r"C:\Windows"),
    (r"(?i)c:\\program files", r"C:\Program Files"),
    (r"(?i)system32", "System32"),
    // Credential directories
    (r"(?i)\.ssh", ".ssh"),
    (r"(?i)\.aws", ".aws"),
    (r"(?i)\.gnupg", ".gnupg"),
    // Secret-suggesting file names
    (r"(?i)\bpasswd\b", "passwd"),
    (r"(?i)\bshadow\b", "shadow"),
    (r"(?i)id_rsa", "id_rsa"),
    (r"(?i)\.pem\b", ".pem"),
    (r"(?i)secret", "secret"),
    (r"(?i)credential", "credential"),
    (r"(?i)\.env\b", ".env"),
    (r"(?i)api[_-]?key", "api key"),
];

/// Shell operators that chain, redirect, or substitute commands
///
/// `>>` precedes `>` so the reported reason names the operator that was
/// actually written.
pub const DANGEROUS_OPERATORS: &[&str] = &[">>", ">", "|", "&", ";", "$(", "`"];

/// A single blocklist rule
///
/// Each variant is a pure predicate; evaluation never consults state
/// beyond the command text, so verdicts cannot go stale.
#[derive(Debug)]
pub enum PolicyRule {
    /// Command starts with a blocked verb
    BlockedVerb(&'static str),

    /// Command references a sensitive path or file
    SensitivePath {
        /// Compiled case-insensitive pattern
        pattern: Regex,
        /// Label reported in the block reason
        label: &'static str,
    },

    /// Command contains a dangerous shell operator
    DangerousOperator(&'static str),
}

impl PolicyRule {
    /// Evaluate the rule against a command
    ///
    /// # Arguments
    ///
    /// * `folded` - The command, trimmed and lower-cased
    /// * `raw` - The command as received
    ///
    /// # Returns
    ///
    /// Returns the human-readable block reason when the rule fires
    pub fn evaluate(&self, folded: &str, raw: &str) -> Option<String> {
        match self {
            PolicyRule::BlockedVerb(verb) => {
                if folded.starts_with(verb) {
                    Some(format!("use of '{}' is not permitted", verb))
                } else {
                    None
                }
            }
            PolicyRule::SensitivePath { pattern, label } => {
                if pattern.is_match(raw) {
                    Some(format!(
                        "access to sensitive path '{}' is not permitted",
                        label
                    ))
                } else {
                    None
                }
            }
            PolicyRule::DangerousOperator(op) => {
                if raw.contains(op) {
                    Some(format!("shell operator '{}' is not permitted", op))
                } else {
                    None
                }
            }
        }
    }

    /// The rule class, used as a metrics label
    pub fn class(&self) -> &'static str {
        match self {
            PolicyRule::BlockedVerb(_) => "verb",
            PolicyRule::SensitivePath { .. } => "path",
            PolicyRule::DangerousOperator(_) => "operator",
        }
    }
}

/// Build the default ordered rule table: verbs, then paths, then operators
pub fn default_rules() -> Vec<PolicyRule> {
    let mut rules = Vec::new();

    for verb in BLOCKED_VERBS {
        rules.push(PolicyRule::BlockedVerb(verb));
    }

    for (pattern, label) in SENSITIVE_PATH_PATTERNS {
        rules.push(PolicyRule::SensitivePath {
            pattern: Regex::new(pattern).expect("Invalid regex pattern"),
            label,
        });
    }

    for op in DANGEROUS_OPERATORS {
        rules.push(PolicyRule::DangerousOperator(op));
    }

    rules
}
