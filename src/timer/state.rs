//! Persisted timer record and its state machine

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TimerError},
    schedule::{Schedule, SchemaError},
};

/// Clock status of a game's timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "idle" => Ok(TimerStatus::Idle),
            "running" => Ok(TimerStatus::Running),
            "paused" => Ok(TimerStatus::Paused),
            other => Err(format!("unknown timer status '{}'", other)),
        }
    }
}

/// Operations that move a timer between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Start,
    Pause,
    Resume,
    Reset,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Pause => "pause",
            Transition::Resume => "resume",
            Transition::Reset => "reset",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transition {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Transition::Start),
            "pause" => Ok(Transition::Pause),
            "resume" => Ok(Transition::Resume),
            "reset" => Ok(Transition::Reset),
            other => Err(TimerError::UnknownTransition {
                name: other.to_string(),
            }),
        }
    }
}

/// Timer record persisted per game.
///
/// `paused_at` is set exactly when the status is `Paused`, and
/// `started_at` exactly when the status is not `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub status: TimerStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub total_paused_seconds: i64,
    pub schedule: Schedule,
}

impl TimerState {
    /// Create an idle timer over `schedule`
    pub fn new(schedule: Schedule) -> Self {
        Self {
            status: TimerStatus::Idle,
            started_at: None,
            paused_at: None,
            total_paused_seconds: 0,
            schedule,
        }
    }

    /// Check the field invariants of a record read back from storage
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.paused_at.is_some() != (self.status == TimerStatus::Paused) {
            return Err(format!("paused_at does not match status {}", self.status));
        }
        if self.started_at.is_some() != (self.status != TimerStatus::Idle) {
            return Err(format!("started_at does not match status {}", self.status));
        }
        if self.total_paused_seconds < 0 {
            return Err("total_paused_seconds is negative".to_string());
        }
        Ok(())
    }

    /// Apply `transition` at `now`, returning the resulting record.
    ///
    /// `fallback` replaces an empty schedule when the clock starts.
    pub fn apply(
        &self,
        transition: Transition,
        now: DateTime<Utc>,
        fallback: &Schedule,
    ) -> Result<TimerState> {
        let rejected = || TimerError::InvalidTransition {
            transition,
            status: self.status,
        };

        let mut next = self.clone();
        match transition {
            Transition::Start => {
                if self.status != TimerStatus::Idle {
                    return Err(rejected());
                }
                if next.schedule.is_empty() {
                    next.schedule = fallback.clone();
                }
                next.status = TimerStatus::Running;
                next.started_at = Some(now);
                next.paused_at = None;
                next.total_paused_seconds = 0;
            }
            Transition::Pause => {
                if self.status != TimerStatus::Running {
                    return Err(rejected());
                }
                next.status = TimerStatus::Paused;
                next.paused_at = Some(now);
            }
            Transition::Resume => {
                let paused_at = match (self.status, self.paused_at) {
                    (TimerStatus::Paused, Some(paused_at)) => paused_at,
                    _ => return Err(rejected()),
                };
                let paused_for = (now - paused_at).num_seconds().max(0);
                next.status = TimerStatus::Running;
                next.paused_at = None;
                next.total_paused_seconds = self.total_paused_seconds.saturating_add(paused_for);
            }
            Transition::Reset => {
                next.status = TimerStatus::Idle;
                next.started_at = None;
                next.paused_at = None;
                next.total_paused_seconds = 0;
            }
        }

        Ok(next)
    }

    /// Swap in a new schedule without touching the clock
    pub fn replace_schedule(
        &self,
        schedule: Schedule,
    ) -> std::result::Result<TimerState, SchemaError> {
        schedule.validate()?;
        Ok(TimerState {
            schedule,
            ..self.clone()
        })
    }

    /// Seconds of running time at `now`, excluding paused intervals
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let started_at = match (self.status, self.started_at) {
            (TimerStatus::Idle, _) | (_, None) => return 0,
            (_, Some(started_at)) => started_at,
        };

        let end_reference = match self.status {
            TimerStatus::Paused => self.paused_at.unwrap_or(now),
            _ => now,
        };

        let wall = (end_reference - started_at).num_seconds();
        wall.saturating_sub(self.total_paused_seconds).max(0)
    }
}
