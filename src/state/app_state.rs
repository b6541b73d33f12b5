//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::GameStatus;
use crate::{
    error::{Result, TimerError},
    schedule::{PresetBook, Schedule},
    store::TimerStore,
    timer::{snapshot, Snapshot, TimerState, Transition},
};

/// Shared service state handed to every request handler
#[derive(Debug)]
pub struct AppState {
    /// Persistent timer and preset storage
    pub store: TimerStore,
    /// Schedule given to timers that have none yet
    pub default_schedule: Schedule,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState over an opened store
    pub fn new(store: TimerStore, default_schedule: Schedule, port: u16, host: String) -> Self {
        Self {
            store,
            default_schedule,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    fn record_action(&self, action: String) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Derive the timer snapshot of a game at `now`
    pub async fn timer_snapshot(&self, game_id: &str, now: DateTime<Utc>) -> Result<Snapshot> {
        let stored = self.store.load_or_init_timer(game_id, &self.default_schedule).await?;
        let snap = snapshot(&stored.state, now)?;

        debug!(
            "Timer snapshot for game {}: status={}, level={}, remaining={}s",
            game_id, snap.status, snap.current_level_index, snap.remaining_seconds
        );
        Ok(snap)
    }

    /// Apply a clock transition to a game's timer.
    ///
    /// Starting also requires the game to be in progress; that status is
    /// read and checked in the same swap as the timer row.
    pub async fn apply_transition(
        &self,
        game_id: &str,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<TimerState> {
        let fallback = &self.default_schedule;
        let result = self
            .store
            .update_timer(game_id, fallback, |current, game_status| {
                if transition == Transition::Start && !game_status.allows_timer_start() {
                    return Err(TimerError::PreconditionFailed(format!(
                        "game {} is {}, it must be in progress to start the timer",
                        game_id, game_status
                    )));
                }
                current.apply(transition, now, fallback)
            })
            .await;

        match &result {
            Ok(state) => {
                info!("Timer for game {}: {} -> {}", game_id, transition, state.status);
                self.record_action(format!("{} {}", transition, game_id));
            }
            Err(e @ TimerError::InvalidTransition { .. })
            | Err(e @ TimerError::PreconditionFailed(_)) => {
                warn!("Rejected timer transition for game {}: {}", game_id, e);
            }
            Err(e) => {
                warn!("Timer transition {} failed for game {}: {}", transition, game_id, e);
            }
        }

        result
    }

    /// Replace the schedule of a game's timer, keeping its clock
    pub async fn replace_schedule(&self, game_id: &str, schedule: Schedule) -> Result<TimerState> {
        let state = self
            .store
            .update_timer(game_id, &self.default_schedule, |current, _| {
                current.replace_schedule(schedule.clone()).map_err(TimerError::from)
            })
            .await?;

        info!(
            "Timer schedule for game {} replaced with {} levels ({}s total)",
            game_id,
            state.schedule.len(),
            state.schedule.total_duration()
        );
        self.record_action(format!("schedule {}", game_id));
        Ok(state)
    }

    /// Copy the preset at `index` into a game's timer
    pub async fn apply_preset(&self, game_id: &str, index: usize) -> Result<TimerState> {
        let book = self.store.list_presets().await?;
        let preset = book
            .select(index)
            .cloned()
            .ok_or(TimerError::PresetNotFound { index })?;
        info!("Applying preset '{}' (#{}) to game {}", preset.name, index, game_id);
        self.replace_schedule(game_id, preset.levels).await
    }

    pub async fn list_presets(&self) -> Result<PresetBook> {
        self.store.list_presets().await
    }

    /// Replace the stored preset collection
    pub async fn save_presets(&self, book: PresetBook) -> Result<PresetBook> {
        self.store.save_presets(&book).await?;
        self.record_action("save presets".to_string());
        Ok(book)
    }

    /// Record the lifecycle status of a game
    pub async fn set_game_status(&self, game_id: &str, status: GameStatus) -> Result<()> {
        self.store.upsert_game(game_id, status).await?;
        info!("Game {} is now {}", game_id, status);
        self.record_action(format!("game {} {}", game_id, status));
        Ok(())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
