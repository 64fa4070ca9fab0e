//! Session lifecycle management
//!
//! The manager owns the session store and the per-session rate windows
//! and is the only component that deletes entries from either. Expiry
//! happens two ways: lazily, when an expired session fails validation,
//! and in bulk via the periodic idle sweep. Validation measures age from
//! creation; the sweep measures idleness from last activity.

use crate::config::SessionConfig;
use crate::session::rate_limit::RateWindows;
use crate::session::store::{SessionRecord, SessionStore};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Lifecycle manager for sessions and their rate windows
pub struct SessionManager {
    /// Injected session store
    store: Arc<SessionStore>,

    /// Per-session sliding rate windows
    windows: RateWindows,

    /// Maximum session age, measured from creation
    max_lifetime: Duration,

    /// Minimum interval between idle sweeps
    sweep_interval: Duration,

    /// When the last sweep ran
    last_sweep: Mutex<Instant>,
}

impl SessionManager {
    /// Create a new manager over an injected store
    ///
    /// # Arguments
    ///
    /// * `store` - Shared session store
    /// * `config` - Session lifecycle configuration
    pub fn new(store: Arc<SessionStore>, config: &SessionConfig) -> Self {
        Self {
            store,
            windows: RateWindows::new(config.max_commands_per_minute),
            max_lifetime: Duration::from_secs(config.max_lifetime_seconds),
            sweep_interval: Duration::from_secs(config.sweep_interval_seconds),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Mint a new session
    ///
    /// # Returns
    ///
    /// Returns the freshly minted session id
    pub fn create_session(&self) -> String {
        let id = self.store.create();
        crate::metrics::record_session_created();
        tracing::info!(session_id = %id, "Session created");
        id
    }

    /// Validate a session id, refreshing its activity timestamp
    ///
    /// A session is valid while its age since creation is within the
    /// configured maximum lifetime. Expired sessions are deleted on the
    /// spot, along with their rate window.
    ///
    /// # Returns
    ///
    /// Returns true when the session is known and within its lifetime
    pub fn validate_session(&self, id: &str) -> bool {
        self.validate_session_at(id, Instant::now())
    }

    fn validate_session_at(&self, id: &str, now: Instant) -> bool {
        let max_lifetime = self.max_lifetime;
        let expired = match self.store.update(id, |rec| {
            if now.duration_since(rec.created_at) > max_lifetime {
                true
            } else {
                rec.last_activity_at = now;
                false
            }
        }) {
            Some(expired) => expired,
            None => {
                tracing::debug!(session_id = %id, "Unknown session id");
                return false;
            }
        };

        if expired {
            self.delete_session(id);
            crate::metrics::record_session_expired("lazy");
            tracing::info!(session_id = %id, "Session expired, lifetime exceeded");
            return false;
        }

        true
    }

    /// Check and record one command admission for a session
    ///
    /// # Returns
    ///
    /// Returns true when the command is admitted; false when the session
    /// has exhausted its window (nothing is recorded in that case)
    pub fn check_rate(&self, id: &str) -> bool {
        let admitted = self.windows.check_and_record(id);
        if !admitted {
            crate::metrics::record_rate_limited();
            tracing::warn!(session_id = %id, "Rate limit exceeded");
        }
        admitted
    }

    /// Bump the advisory command counter for a session
    pub fn note_command(&self, id: &str) {
        self.store.update(id, |rec| rec.command_count += 1);
    }

    /// Run the idle sweep if the interval has elapsed
    ///
    /// The sweep deletes every session whose last activity is older than
    /// the maximum lifetime, together with its rate window. Calls inside
    /// the interval are no-ops, however frequent.
    ///
    /// # Returns
    ///
    /// Returns true when a sweep actually ran
    pub fn maybe_sweep(&self) -> bool {
        self.maybe_sweep_at(Instant::now())
    }

    fn maybe_sweep_at(&self, now: Instant) -> bool {
        {
            let mut last = self.last_sweep.lock().unwrap();
            if now.duration_since(*last) < self.sweep_interval {
                return false;
            }
            *last = now;
        }

        let swept = self.sweep_at(now);
        if swept > 0 {
            tracing::info!(swept, "Idle sweep removed sessions");
        } else {
            tracing::debug!("Idle sweep found nothing to remove");
        }
        true
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let idle = self.store.idle_ids(now, self.max_lifetime);
        let count = idle.len();
        for id in &idle {
            self.delete_session(id);
            crate::metrics::record_session_expired("sweep");
        }
        count
    }

    fn delete_session(&self, id: &str) {
        self.store.remove(id);
        self.windows.remove(id);
    }

    /// Snapshot of a session record, if present
    pub fn snapshot(&self, id: &str) -> Option<SessionRecord> {
        self.store.get(id)
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.store.len()
    }
}
