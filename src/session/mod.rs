//! Session control: store, rate limiting, and lifecycle
//!
//! A session is an opaque UUID token handed to a client on first
//! contact. Every execute request must present one; the lifecycle
//! manager validates it, enforces the per-session command rate, and
//! retires sessions that age out or go idle.

pub mod manager;
pub mod rate_limit;
pub mod store;

pub use manager::SessionManager;
pub use rate_limit::{RateWindows, RATE_WINDOW};
pub use store::{SessionRecord, SessionStore};
