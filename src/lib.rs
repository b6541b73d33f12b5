//! Poker Timer - A persisted tournament blind-level clock server
//!
//! The clock is never ticked in memory. Each game's timer is stored as a
//! record of when it started and how long it has been paused, and every
//! read derives the current level and remaining time from that record and
//! the wall clock.

pub mod config;
pub mod error;
pub mod schedule;
pub mod timer;
pub mod store;
pub mod state;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
