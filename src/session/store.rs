//! In-memory session store
//!
//! Sessions are opaque UUID tokens mapped to activity records. The store
//! itself is a plain thread-safe key-value map; lifecycle decisions
//! (expiry, sweeping) belong to the [`SessionManager`](super::SessionManager).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Per-session activity record
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// When the session was created
    pub created_at: Instant,

    /// When the session last passed validation
    pub last_activity_at: Instant,

    /// Number of commands admitted on this session (advisory)
    pub command_count: u64,
}

impl SessionRecord {
    fn new(now: Instant) -> Self {
        Self {
            created_at: now,
            last_activity_at: now,
            command_count: 0,
        }
    }
}

/// Thread-safe map of session id to record
///
/// Mutation goes through targeted operations so that a check and its
/// follow-up update happen under a single lock acquisition.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new session id and insert a fresh record
    ///
    /// # Returns
    ///
    /// Returns the newly minted session id
    pub fn create(&self) -> String {
        self.create_at(Instant::now())
    }

    pub(crate) fn create_at(&self, now: Instant) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(id.clone(), SessionRecord::new(now));
        id
    }

    /// Snapshot of a session record, if present
    pub fn get(&self, id: &str) -> Option<SessionRecord> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    /// Apply a mutation to a session record under the store lock
    ///
    /// Returns `None` when the id is unknown.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut SessionRecord) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.get_mut(id).map(f)
    }

    /// Remove a session record
    ///
    /// # Returns
    ///
    /// Returns true when a record existed for the id
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.lock().unwrap().remove(id).is_some()
    }

    /// Whether a record exists for the id
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.lock().unwrap().contains_key(id)
    }

    /// Ids of sessions whose last activity is older than `max_idle`
    pub fn idle_ids(&self, now: Instant, max_idle: Duration) -> Vec<String> {
        let sessions = self.sessions.lock().unwrap();
        sessions
            .iter()
            .filter(|(_, rec)| now.duration_since(rec.last_activity_at) > max_idle)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Whether the store holds no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}
