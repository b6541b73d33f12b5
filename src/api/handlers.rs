//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use tracing::info;

use crate::{
    error::Result,
    schedule::PresetBook,
    state::AppState,
    timer::{snapshot, Transition},
};
use super::responses::{
    GameStatusRequest, GameStatusResponse, HealthResponse, ScheduleRequest, StatusResponse,
    TimerResponse,
};

/// Snapshot a game's timer at the current instant
async fn current_timer(state: &AppState, game_id: String) -> Result<Json<TimerResponse>> {
    let now = Utc::now();
    let snapshot = state.timer_snapshot(&game_id, now).await?;
    Ok(Json(TimerResponse::new(game_id, snapshot, now)))
}

/// Handle GET /api/games/:game_id/timer - Current timer snapshot
pub async fn timer_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<Json<TimerResponse>> {
    current_timer(&state, game_id).await
}

/// Handle PUT /api/games/:game_id/timer/:transition - Start, pause, resume or reset the clock
pub async fn transition_handler(
    State(state): State<Arc<AppState>>,
    Path((game_id, transition)): Path<(String, String)>,
) -> Result<Json<TimerResponse>> {
    let transition: Transition = transition.parse()?;
    let now = Utc::now();
    let timer = state.apply_transition(&game_id, transition, now).await?;
    let snap = snapshot(&timer, now)?;
    Ok(Json(TimerResponse::new(game_id, snap, now)))
}

/// Handle PUT /api/games/:game_id/timer/schedule - Replace the running schedule
pub async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<TimerResponse>> {
    state.replace_schedule(&game_id, request.schedule).await?;
    current_timer(&state, game_id).await
}

/// Handle PUT /api/games/:game_id/timer/preset/:index - Apply a stored preset
pub async fn apply_preset_handler(
    State(state): State<Arc<AppState>>,
    Path((game_id, index)): Path<(String, usize)>,
) -> Result<Json<TimerResponse>> {
    state.apply_preset(&game_id, index).await?;
    current_timer(&state, game_id).await
}

/// Handle PUT /api/games/:game_id/status - Record the game's lifecycle status
pub async fn game_status_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
    Json(request): Json<GameStatusRequest>,
) -> Result<Json<GameStatusResponse>> {
    state.set_game_status(&game_id, request.status).await?;
    Ok(Json(GameStatusResponse {
        game_id,
        status: request.status,
    }))
}

/// Handle GET /api/club/timer/presets - List stored presets
pub async fn list_presets_handler(State(state): State<Arc<AppState>>) -> Result<Json<PresetBook>> {
    Ok(Json(state.list_presets().await?))
}

/// Handle PUT /api/club/timer/presets - Replace all presets
pub async fn save_presets_handler(
    State(state): State<Arc<AppState>>,
    Json(book): Json<PresetBook>,
) -> Result<Json<PresetBook>> {
    info!("Saving {} timer presets", book.len());
    Ok(Json(state.save_presets(book).await?))
}

/// Handle GET /status - Return server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
