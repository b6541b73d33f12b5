//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    error::TimerError,
    schedule::{Level, Schedule},
    state::GameStatus,
    timer::{Snapshot, TimerStatus},
};

/// Timer snapshot of one game as served to pollers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub game_id: String,
    pub status: TimerStatus,
    pub current_level_index: usize,
    pub current: Level,
    pub next: Option<Level>,
    pub remaining_seconds: i64,
    pub elapsed_seconds: i64,
    pub level_count: usize,
    pub server_time: DateTime<Utc>,
}

impl TimerResponse {
    pub fn new(game_id: String, snapshot: Snapshot, server_time: DateTime<Utc>) -> Self {
        Self {
            game_id,
            status: snapshot.status,
            current_level_index: snapshot.current_level_index,
            current: snapshot.current,
            next: snapshot.next,
            remaining_seconds: snapshot.remaining_seconds,
            elapsed_seconds: snapshot.elapsed_seconds,
            level_count: snapshot.level_count,
            server_time,
        }
    }
}

/// Request body for replacing a game's schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub schedule: Schedule,
}

/// Request body for updating a game's lifecycle status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatusRequest {
    pub status: GameStatus,
}

/// Response for a game status update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatusResponse {
    pub game_id: String,
    pub status: GameStatus,
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

impl TimerError {
    /// HTTP status the error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            TimerError::NotFound { .. }
            | TimerError::PresetNotFound { .. }
            | TimerError::UnknownTransition { .. } => StatusCode::NOT_FOUND,
            TimerError::InvalidTransition { .. } | TimerError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            TimerError::InvalidSchedule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TimerError::PreconditionFailed(_) => StatusCode::BAD_REQUEST,
            TimerError::Storage(_) | TimerError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TimerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
