//! Termwarden - remote command-execution gateway library
//!
//! This library provides the core functionality of the termwarden
//! gateway: session-scoped command execution behind a policy firewall,
//! with AI-assisted diagnosis of terminal output.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Session store, lifetime management, and rate limiting
//! - `policy`: Ordered blocklist engine deciding what may run
//! - `gateway`: The per-request pipeline and the shell executor
//! - `suggest`: Suggestion oracle, filter, and analysis service
//! - `server`: Axum HTTP API over the gateway
//! - `config`: Configuration management and validation
//! - `metrics`: Counter and histogram helpers for request outcomes
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use termwarden::cli::Cli;
//! use termwarden::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     termwarden::server::start_server(config).await
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod policy;
pub mod server;
pub mod session;
pub mod suggest;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, WardenError};
pub use gateway::{CommandGateway, ExecuteOutcome, GatewayRejection, InvocationResult};
pub use policy::{CommandPolicy, Verdict};
pub use session::SessionManager;
pub use suggest::SuggestionService;
