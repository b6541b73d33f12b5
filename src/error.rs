//! Error taxonomy for timer operations

use thiserror::Error;

use crate::{
    schedule::SchemaError,
    timer::{TimerStatus, Transition},
};

pub type Result<T> = std::result::Result<T, TimerError>;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("game {game_id} not found")]
    NotFound { game_id: String },

    #[error("cannot {transition} a timer that is {status}")]
    InvalidTransition {
        transition: Transition,
        status: TimerStatus,
    },

    #[error("unknown timer transition '{name}'")]
    UnknownTransition { name: String },

    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] SchemaError),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("no preset at index {index}")]
    PresetNotFound { index: usize },

    #[error("timer for game {game_id} kept changing, giving up")]
    Conflict { game_id: String },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("corrupt timer record: {0}")]
    Corrupt(String),
}

impl TimerError {
    pub fn not_found(game_id: &str) -> Self {
        TimerError::NotFound {
            game_id: game_id.to_string(),
        }
    }
}
