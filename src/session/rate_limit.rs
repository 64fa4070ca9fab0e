//! Per-session sliding-window rate limiting
//!
//! Each session id owns a vector of admission timestamps. A check prunes
//! entries older than the rolling window, then admits and records only
//! when capacity remains; a rejected attempt records nothing, so it does
//! not extend the caller's lockout.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Length of the rolling admission window
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window admission tracker, one window per session id
#[derive(Debug)]
pub struct RateWindows {
    /// Maximum admissions per session within the window
    max_per_minute: u32,

    /// Admission timestamps keyed by session id
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateWindows {
    /// Create a new tracker
    ///
    /// # Arguments
    ///
    /// * `max_per_minute` - Maximum admissions allowed per session per window
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            max_per_minute,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Check and record one admission for a session
    ///
    /// The prune, the capacity check, and the append happen under one
    /// lock acquisition, so concurrent requests on the same session
    /// cannot both claim the final slot.
    ///
    /// # Returns
    ///
    /// Returns true when admitted; false (recording nothing) when the
    /// window is already at capacity.
    pub fn check_and_record(&self, session_id: &str) -> bool {
        self.admit_at(session_id, Instant::now())
    }

    fn admit_at(&self, session_id: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap();
        let window = windows.entry(session_id.to_string()).or_default();

        // Remove admissions that have rolled out of the window
        window.retain(|&at| now.duration_since(at) < RATE_WINDOW);

        if window.len() >= self.max_per_minute as usize {
            return false;
        }

        window.push(now);
        true
    }

    /// Drop the window for a session
    pub fn remove(&self, session_id: &str) {
        self.windows.lock().unwrap().remove(session_id);
    }

    /// Whether a window is currently tracked for a session
    pub fn contains(&self, session_id: &str) -> bool {
        self.windows.lock().unwrap().contains_key(session_id)
    }

    /// Number of sessions with a tracked window
    pub fn tracked_sessions(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}
