//! Integration tests for the timer HTTP API
//!
//! These drive the full router against an in-memory database.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use poker_timer::{create_router, schedule::Schedule, store::TimerStore, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a router over a fresh in-memory store
async fn setup() -> Router {
    let store = TimerStore::in_memory().await.unwrap();
    let state = Arc::new(AppState::new(
        store,
        Schedule::default_schedule(600),
        0,
        "127.0.0.1".to_string(),
    ));
    create_router(state)
}

/// Helper to send a request and decode its JSON body
async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_game(app: &Router, game_id: &str, status: &str) {
    let (code, body) = send(
        app,
        Method::PUT,
        &format!("/api/games/{}/status", game_id),
        Some(json!({ "status": status })),
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], status);
}

// ============================================================================
// Server metadata
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup().await;

    let (code, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_status_reports_last_action() {
    let app = setup().await;
    create_game(&app, "g1", "in_progress").await;

    let (code, body) = send(&app, Method::GET, "/status", None).await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["last_action"], "game g1 in_progress");
}

// ============================================================================
// Timer reads
// ============================================================================

#[tokio::test]
async fn test_unknown_game_timer_is_not_found() {
    let app = setup().await;

    let (code, body) = send(&app, Method::GET, "/api/games/nope/timer", None).await;

    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_first_read_returns_idle_default_timer() {
    let app = setup().await;
    create_game(&app, "g1", "scheduled").await;

    let (code, body) = send(&app, Method::GET, "/api/games/g1/timer", None).await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["game_id"], "g1");
    assert_eq!(body["status"], "idle");
    assert_eq!(body["current_level_index"], 0);
    assert_eq!(body["elapsed_seconds"], 0);
    assert_eq!(body["remaining_seconds"], 600);
    assert_eq!(body["current"]["kind"], "blind");
    assert_eq!(body["current"]["small_blind"], 25);
    assert_eq!(body["next"]["big_blind"], 100);
}

// ============================================================================
// Transitions
// ============================================================================

#[tokio::test]
async fn test_start_requires_game_in_progress() {
    let app = setup().await;
    create_game(&app, "g1", "scheduled").await;

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/start", None).await;

    assert_eq!(code, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("in progress"));
}

#[tokio::test]
async fn test_full_transition_cycle() {
    let app = setup().await;
    create_game(&app, "g1", "in_progress").await;

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/start", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/pause", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "paused");

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/resume", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/reset", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["elapsed_seconds"], 0);
}

#[tokio::test]
async fn test_wrong_state_transitions_conflict() {
    let app = setup().await;
    create_game(&app, "g1", "in_progress").await;

    let (code, _) = send(&app, Method::PUT, "/api/games/g1/timer/pause", None).await;
    assert_eq!(code, StatusCode::CONFLICT);

    let (code, _) = send(&app, Method::PUT, "/api/games/g1/timer/start", None).await;
    assert_eq!(code, StatusCode::OK);

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/start", None).await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("running"));

    let (code, _) = send(&app, Method::PUT, "/api/games/g1/timer/resume", None).await;
    assert_eq!(code, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_transition_name_is_not_found() {
    let app = setup().await;
    create_game(&app, "g1", "in_progress").await;

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/rewind", None).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("rewind"));

    let (code, body) = send(&app, Method::GET, "/api/games/g1/timer", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "idle");
}

// ============================================================================
// Schedules and presets
// ============================================================================

#[tokio::test]
async fn test_replace_schedule_validates_levels() {
    let app = setup().await;
    create_game(&app, "g1", "in_progress").await;

    let (code, _) = send(
        &app,
        Method::PUT,
        "/api/games/g1/timer/schedule",
        Some(json!({ "schedule": [] })),
    )
    .await;
    assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);

    let (code, _) = send(
        &app,
        Method::PUT,
        "/api/games/g1/timer/schedule",
        Some(json!({ "schedule": [{
            "kind": "blind",
            "label": "1",
            "small_blind": -25,
            "big_blind": 50,
            "duration_seconds": 600
        }] })),
    )
    .await;
    assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);

    let (code, body) = send(
        &app,
        Method::PUT,
        "/api/games/g1/timer/schedule",
        Some(json!({ "schedule": [
            {
                "kind": "blind",
                "label": "1",
                "small_blind": 100,
                "big_blind": 200,
                "ante": 25,
                "duration_seconds": 1200
            },
            { "kind": "break", "label": "Dinner", "duration_seconds": 1800 }
        ] })),
    )
    .await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["level_count"], 2);
    assert_eq!(body["current"]["ante"], 25);
    assert_eq!(body["next"]["kind"], "break");
    assert_eq!(body["next"]["label"], "Dinner");
}

#[tokio::test]
async fn test_presets_save_list_and_apply_by_index() {
    let app = setup().await;
    create_game(&app, "g1", "scheduled").await;

    let blind = |label: &str, small: i64, big: i64, seconds: i64| {
        json!({
            "kind": "blind",
            "label": label,
            "small_blind": small,
            "big_blind": big,
            "ante": 0,
            "duration_seconds": seconds
        })
    };
    let presets = json!({ "presets": [
        { "name": "Deep", "levels": [blind("1", 10, 20, 1800)] },
        { "name": "Deep", "levels": [blind("1", 50, 100, 300), blind("2", 100, 200, 300)] }
    ] });

    let (code, _) = send(
        &app,
        Method::PUT,
        "/api/club/timer/presets",
        Some(presets.clone()),
    )
    .await;
    assert_eq!(code, StatusCode::OK);

    let (code, body) = send(&app, Method::GET, "/api/club/timer/presets", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, presets);

    let (code, body) = send(&app, Method::PUT, "/api/games/g1/timer/preset/1", None).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["level_count"], 2);
    assert_eq!(body["current"]["small_blind"], 50);

    let (code, _) = send(&app, Method::PUT, "/api/games/g1/timer/preset/5", None).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_preset_list() {
    let app = setup().await;

    let (code, body) = send(&app, Method::GET, "/api/club/timer/presets", None).await;

    assert_eq!(code, StatusCode::OK);
    assert_eq!(body, json!({ "presets": [] }));
}
