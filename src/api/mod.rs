//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/games/:game_id/timer", get(timer_handler))
        .route("/api/games/:game_id/timer/schedule", put(schedule_handler))
        .route("/api/games/:game_id/timer/preset/:index", put(apply_preset_handler))
        .route("/api/games/:game_id/timer/:transition", put(transition_handler))
        .route("/api/games/:game_id/status", put(game_status_handler))
        .route(
            "/api/club/timer/presets",
            get(list_presets_handler).put(save_presets_handler),
        )
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
