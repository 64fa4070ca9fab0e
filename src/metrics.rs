//! Performance metrics for the command gateway
//!
//! This module provides metrics collection for command execution and
//! session lifecycle events, labeled by outcome so rejected, blocked,
//! and executed commands can be analyzed separately.
//!
//! # Metrics
//!
//! - `gateway_commands_total`: Counter of commands received
//! - `gateway_command_duration_seconds`: Histogram of handling duration
//! - `gateway_command_outcomes_total`: Counter of outcomes by kind
//! - `gateway_inflight_commands`: Gauge of commands being handled
//! - `gateway_sessions_created_total`: Counter of sessions minted
//! - `gateway_sessions_expired_total`: Counter of expiries by mode
//! - `gateway_rate_limited_total`: Counter of rate-limit rejections
//! - `gateway_policy_blocks_total`: Counter of policy blocks by rule
//! - `gateway_suggestions_total`: Counter of suggestion outcomes
//!
//! # Examples
//!
//! ```
//! use termwarden::metrics::CommandMetrics;
//!
//! let metrics = CommandMetrics::new();
//! metrics.record_outcome("executed_ok");
//! ```

use metrics::{decrement_gauge, histogram, increment_counter, increment_gauge};
use std::cell::Cell;
use std::time::Instant;

/// Metrics collection for a single command request
///
/// Tracks timing and outcome for one pass through the gateway. Uses
/// interior mutability (Cell) to allow recording through immutable
/// references in async contexts.
#[derive(Debug)]
pub struct CommandMetrics {
    /// When handling started
    start: Instant,

    /// Whether metrics have been recorded to prevent double-recording
    recorded: Cell<bool>,
}

impl CommandMetrics {
    /// Creates a new metrics tracker for a command request
    ///
    /// Increments the received counter and the in-flight gauge.
    pub fn new() -> Self {
        increment_counter!("gateway_commands_total");
        increment_gauge!("gateway_inflight_commands", 1.0);

        Self {
            start: Instant::now(),
            recorded: Cell::new(false),
        }
    }

    /// Records the outcome of a command request
    ///
    /// # Arguments
    ///
    /// * `outcome` - Outcome label ("executed_ok", "executed_failed",
    ///   "policy_blocked", "builtin_cd", "builtin_clear", "empty",
    ///   "timeout", "not_found", "error")
    pub fn record_outcome(&self, outcome: &str) {
        if self.recorded.get() {
            return;
        }
        self.recorded.set(true);

        let duration = self.start.elapsed();

        histogram!(
            "gateway_command_duration_seconds",
            duration.as_secs_f64(),
            "outcome" => outcome.to_string()
        );

        increment_counter!(
            "gateway_command_outcomes_total",
            "outcome" => outcome.to_string()
        );

        decrement_gauge!("gateway_inflight_commands", 1.0);
    }

    /// Returns elapsed time since handling started
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Default for CommandMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CommandMetrics {
    /// Keeps the in-flight gauge accurate when no outcome was recorded
    fn drop(&mut self) {
        if !self.recorded.get() {
            decrement_gauge!("gateway_inflight_commands", 1.0);
        }
    }
}

/// Records a freshly minted session
pub fn record_session_created() {
    increment_counter!("gateway_sessions_created_total");
}

/// Records a session expiry
///
/// # Arguments
///
/// * `mode` - How the expiry happened ("lazy" or "sweep")
pub fn record_session_expired(mode: &str) {
    increment_counter!("gateway_sessions_expired_total", "mode" => mode.to_string());
}

/// Records a rate-limit rejection
pub fn record_rate_limited() {
    increment_counter!("gateway_rate_limited_total");
}

/// Records a policy block
///
/// # Arguments
///
/// * `rule` - Which rule class fired ("verb", "path", "operator")
pub fn record_policy_block(rule: &str) {
    increment_counter!("gateway_policy_blocks_total", "rule" => rule.to_string());
}

/// Records a suggestion outcome
///
/// # Arguments
///
/// * `outcome` - Outcome label ("clear", "suspicious", "blocked_topic",
///   "gated", "error")
pub fn record_suggestion(outcome: &str) {
    increment_counter!("gateway_suggestions_total", "outcome" => outcome.to_string());
}

/// Initializes the metrics exporter for Prometheus
///
/// When the `prometheus` feature is enabled, this function sets up the
/// Prometheus metrics exporter on the standard endpoint. When disabled,
/// it's a no-op that is still safe to call.
pub fn init_metrics_exporter() {
    #[cfg(feature = "prometheus")]
    {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let _ = builder.install().map_err(|e| {
            tracing::warn!("Failed to install Prometheus exporter: {}", e);
        });
    }
}
