//! State management module
//!
//! This module contains the shared service state and the game status it
//! consults before starting a clock.

pub mod app_state;
pub mod game_status;

// Re-export main types
pub use app_state::AppState;
pub use game_status::GameStatus;
