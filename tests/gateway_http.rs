//! HTTP integration tests for the gateway API
//!
//! These tests drive the full axum router with `oneshot` dispatch against
//! a scripted shell executor; no real processes are spawned and no oracle
//! credentials are configured.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{ok_output, scripted_state};
use serde_json::json;
use termwarden::config::{Config, SessionConfig};
use termwarden::error::WardenError;
use termwarden::gateway::{
    ShellOutput, CLEAR_SCREEN_SENTINEL, INVALID_SESSION_MESSAGE, RATE_LIMIT_MESSAGE,
};
use termwarden::server::build_router;
use termwarden::suggest::SUGGESTION_REFUSAL;
use tower::ServiceExt;

async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

fn config_with_rate(max_per_minute: u32) -> Config {
    Config {
        session: SessionConfig {
            max_commands_per_minute: max_per_minute,
            ..SessionConfig::default()
        },
        ..Config::default()
    }
}

// ===========================================================================
// GET /health:responds 200 with the fixed liveness body
// ===========================================================================
#[tokio::test]
async fn test_health_endpoint() {
    let (state, _) = scripted_state(vec![], Config::default());
    let app = build_router(state);

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Server is running!");
    assert!(body["version"].is_string());
    assert_eq!(body["active_sessions"], 0);
}

// ===========================================================================
// POST /execute:fresh client gets a session and command output back
// ===========================================================================
#[tokio::test]
async fn test_execute_mints_session_and_returns_output() {
    let (state, shell) = scripted_state(vec![ok_output("hello\n")], Config::default());
    let app = build_router(state.clone());

    let (status, body) = post_json(app, "/execute", json!({ "command": "echo hello" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], "hello");
    assert_eq!(body["error"], false);
    assert!(!body["session_id"].as_str().unwrap().is_empty());
    assert_eq!(
        body["cwd"],
        state.default_cwd.display().to_string(),
        "cwd defaults to the server working directory"
    );
    assert_eq!(shell.calls().len(), 1);
}

// ===========================================================================
// POST /execute:presented session id is echoed back and reused
// ===========================================================================
#[tokio::test]
async fn test_execute_session_continuity() {
    let (state, _) = scripted_state(
        vec![ok_output("a\n"), ok_output("b\n")],
        Config::default(),
    );
    let app = build_router(state.clone());

    let (_, first) = post_json(app.clone(), "/execute", json!({ "command": "echo a" })).await;
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let (status, second) = post_json(
        app,
        "/execute",
        json!({ "command": "echo b", "session_id": session_id }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["session_id"], session_id);
    assert_eq!(state.sessions.session_count(), 1);
}

// ===========================================================================
// POST /execute:unknown session is rejected with 401
// ===========================================================================
#[tokio::test]
async fn test_execute_unknown_session_unauthorized() {
    let (state, shell) = scripted_state(vec![], Config::default());
    let app = build_router(state);

    let (status, body) = post_json(
        app,
        "/execute",
        json!({ "command": "echo hi", "session_id": "not-a-session" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], INVALID_SESSION_MESSAGE);
    assert!(shell.calls().is_empty());
}

// ===========================================================================
// POST /execute:exhausted rate window is rejected with 429
// ===========================================================================
#[tokio::test]
async fn test_execute_rate_limit_burst() {
    let (state, _) = scripted_state(vec![], config_with_rate(2));
    let app = build_router(state);

    let (_, first) = post_json(app.clone(), "/execute", json!({ "command": "" })).await;
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let (status, _) = post_json(
        app.clone(),
        "/execute",
        json!({ "command": "", "session_id": session_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        app,
        "/execute",
        json!({ "command": "", "session_id": session_id }),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], RATE_LIMIT_MESSAGE);
}

// ===========================================================================
// POST /execute:policy rejections come back in-band as HTTP 200
// ===========================================================================
#[tokio::test]
async fn test_execute_policy_block_in_band() {
    let (state, shell) = scripted_state(vec![], Config::default());
    let app = build_router(state);

    let (status, body) = post_json(app, "/execute", json!({ "command": "sudo reboot" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], true);
    assert_eq!(
        body["output"],
        "Command blocked for security reasons: use of 'sudo' is not permitted"
    );
    assert!(shell.calls().is_empty());
}

// ===========================================================================
// POST /execute:cd changes the session working directory
// ===========================================================================
#[tokio::test]
async fn test_execute_cd_flow() {
    let (state, shell) = scripted_state(vec![], Config::default());
    let app = build_router(state);
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let (status, body) = post_json(
        app.clone(),
        "/execute",
        json!({ "command": "cd sub", "cwd": dir.path().to_str().unwrap() }),
    )
    .await;

    let expected = dir.path().join("sub");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);
    assert_eq!(body["cwd"], expected.display().to_string());
    assert_eq!(
        body["output"],
        format!("Changed directory to {}", expected.display())
    );

    let (_, missing) = post_json(
        app,
        "/execute",
        json!({ "command": "cd nowhere", "cwd": dir.path().to_str().unwrap() }),
    )
    .await;

    assert_eq!(missing["error"], true);
    assert_eq!(missing["cwd"], dir.path().display().to_string());
    assert!(missing["output"]
        .as_str()
        .unwrap()
        .starts_with("The system cannot find the path specified: "));
    assert!(shell.calls().is_empty(), "cd never reaches the shell");
}

// ===========================================================================
// POST /execute:clear returns the sentinel without spawning anything
// ===========================================================================
#[tokio::test]
async fn test_execute_clear_sentinel() {
    let (state, shell) = scripted_state(vec![], Config::default());
    let app = build_router(state);

    let (status, body) = post_json(app, "/execute", json!({ "command": "clear" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"], CLEAR_SCREEN_SENTINEL);
    assert_eq!(body["error"], false);
    assert!(shell.calls().is_empty());
}

// ===========================================================================
// POST /execute:failed commands surface combined output with error=true
// ===========================================================================
#[tokio::test]
async fn test_execute_failed_command_combined_output() {
    let (state, _) = scripted_state(
        vec![Ok(ShellOutput {
            stdout: String::new(),
            stderr: "cat: nope: No such file or directory\n".to_string(),
            exit_code: 1,
        })],
        Config::default(),
    );
    let app = build_router(state);

    let (status, body) = post_json(app, "/execute", json!({ "command": "stat nope" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], true);
    assert_eq!(body["output"], "cat: nope: No such file or directory");
}

// ===========================================================================
// POST /execute:executor timeout comes back as a fixed in-band message
// ===========================================================================
#[tokio::test]
async fn test_execute_timeout_in_band() {
    let (state, _) = scripted_state(
        vec![Err(WardenError::CommandTimedOut { seconds: 30 })],
        Config::default(),
    );
    let app = build_router(state);

    let (status, body) = post_json(app, "/execute", json!({ "command": "sleep 999" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], true);
    assert_eq!(body["output"], "Command timed out (exceeded 30 seconds)");
}

// ===========================================================================
// POST /analyze:rejected output is gated before the oracle
// ===========================================================================
#[tokio::test]
async fn test_analyze_gates_blocked_output() {
    let (state, _) = scripted_state(vec![], Config::default());
    let app = build_router(state);

    let (status, body) = post_json(
        app,
        "/analyze",
        json!({ "output": "Command blocked for security reasons: shell operator '|' is not permitted" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestion"], SUGGESTION_REFUSAL);
}

// ===========================================================================
// POST /execute:malformed JSON is a client error, not a crash
// ===========================================================================
#[tokio::test]
async fn test_execute_malformed_body() {
    let (state, _) = scripted_state(vec![], Config::default());
    let app = build_router(state);

    let req = Request::builder()
        .method("POST")
        .uri("/execute")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
}
