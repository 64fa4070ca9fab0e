//! HTTP API
//!
//! Axum-based server exposing the gateway over three endpoints. Each
//! endpoint has a thin axum handler that delegates to an inner function
//! returning a status code and JSON body; the inner functions are
//! directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /health: liveness check
//! - POST /execute: run one command through the gateway
//! - POST /analyze: suggest a fix for terminal output

use crate::config::Config;
use crate::error::Result;
use crate::gateway::{
    CommandGateway, GatewayRejection, SystemShell, INVALID_SESSION_MESSAGE, RATE_LIMIT_MESSAGE,
};
use crate::policy::CommandPolicy;
use crate::session::{SessionManager, SessionStore};
use crate::suggest::{GroqOracle, SuggestionService};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

/// Shared state for all HTTP handlers
pub struct AppState {
    pub gateway: CommandGateway,
    pub advisor: SuggestionService,
    pub sessions: Arc<SessionManager>,
    pub default_cwd: PathBuf,
    pub started_at: Instant,
    pub started_utc: DateTime<Utc>,
}

impl AppState {
    /// Assemble the full service stack from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the oracle's HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(SessionStore::new());
        let sessions = Arc::new(SessionManager::new(store, &config.session));
        let executor = Arc::new(SystemShell::new(&config.executor));
        let gateway = CommandGateway::new(
            sessions.clone(),
            CommandPolicy::new(),
            executor,
            config,
        );
        let oracle = Arc::new(GroqOracle::new(&config.oracle)?);
        let advisor = SuggestionService::new(oracle);

        Ok(Self {
            gateway,
            advisor,
            sessions,
            default_cwd: default_cwd(config),
            started_at: Instant::now(),
            started_utc: Utc::now(),
        })
    }
}

/// Working directory used when a request does not carry one
fn default_cwd(config: &Config) -> PathBuf {
    config
        .server
        .workdir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")))
}

/// Build the axum router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/execute", post(execute_handler))
        .route("/analyze", post(analyze_handler))
        .with_state(state)
}

/// Start the HTTP server and block until shutdown
///
/// # Errors
///
/// Returns an error if the service stack cannot be assembled or the
/// listener fails to bind.
pub async fn start_server(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::from_config(&config)?);

    tracing::info!(
        cwd = %state.default_cwd.display(),
        "Gateway default working directory"
    );

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("termwarden listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve when the process receives ctrl-c
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for POST /execute
#[derive(Debug, Deserialize, Default)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub command: String,
    pub cwd: Option<PathBuf>,
    pub session_id: Option<String>,
}

/// Request body for POST /analyze
#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub output: String,
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check
pub fn health_inner(state: &AppState) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::OK,
        serde_json::json!({
            "status": "ok",
            "message": "Server is running!",
            "version": env!("CARGO_PKG_VERSION"),
            "started_at": state.started_utc.to_rfc3339(),
            "uptime_seconds": state.started_at.elapsed().as_secs(),
            "active_sessions": state.sessions.session_count(),
        }),
    )
}

/// Inner execute: runs the gateway and maps rejections to status codes
pub async fn execute_inner(
    state: &AppState,
    req: ExecuteRequest,
) -> (StatusCode, serde_json::Value) {
    let cwd = req.cwd.unwrap_or_else(|| state.default_cwd.clone());

    match state
        .gateway
        .execute(req.session_id.as_deref(), &req.command, &cwd)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            serde_json::json!({
                "output": outcome.result.output,
                "error": outcome.result.failed,
                "cwd": outcome.result.cwd.display().to_string(),
                "session_id": outcome.session_id,
            }),
        ),
        Err(GatewayRejection::InvalidSession) => (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "error": INVALID_SESSION_MESSAGE }),
        ),
        Err(GatewayRejection::RateLimited) => (
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({ "error": RATE_LIMIT_MESSAGE }),
        ),
    }
}

/// Inner analyze: always succeeds with a presentable suggestion
pub async fn analyze_inner(
    state: &AppState,
    req: AnalyzeRequest,
) -> (StatusCode, serde_json::Value) {
    let suggestion = state.advisor.analyze(&req.output).await;
    (
        StatusCode::OK,
        serde_json::json!({ "suggestion": suggestion }),
    )
}

// ============================================================================
// Axum handler wrappers (thin, delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state);
    (status, Json(body))
}

pub async fn execute_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExecuteRequest>,
) -> impl IntoResponse {
    let (status, body) = execute_inner(&state, req).await;
    (status, Json(body))
}

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let (status, body) = analyze_inner(&state, req).await;
    (status, Json(body))
}
