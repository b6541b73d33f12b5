//! Blind schedule model
//!
//! A schedule is the ordered list of levels a tournament clock walks
//! through. Presets are named, reusable schedules that get copied into a
//! game's timer when applied.

pub mod level;
pub mod preset;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use level::Level;
pub use preset::{Preset, PresetBook};

/// Reasons a schedule is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schedule has no levels")]
    Empty,

    #[error("level {index} has a non-positive duration")]
    NonPositiveDuration { index: usize },

    #[error("level {index} has a negative blind or ante")]
    NegativeBlind { index: usize },
}

/// Ordered sequence of levels; insertion order is play order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    levels: Vec<Level>,
}

impl Schedule {
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Check the schedule can drive a clock
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.levels.is_empty() {
            return Err(SchemaError::Empty);
        }

        for (index, level) in self.levels.iter().enumerate() {
            if level.duration_seconds() <= 0 {
                return Err(SchemaError::NonPositiveDuration { index });
            }
            match level {
                Level::Blind { small_blind, big_blind, ante, .. } => {
                    if *small_blind < 0 || *big_blind < 0 || *ante < 0 {
                        return Err(SchemaError::NegativeBlind { index });
                    }
                }
                Level::Break { .. } => {}
            }
        }

        Ok(())
    }

    /// Pair each level with the elapsed second at which it begins
    pub fn cumulative_offsets(&self) -> Vec<(i64, &Level)> {
        let mut offset = 0i64;
        self.levels
            .iter()
            .map(|level| {
                let start = offset;
                offset = offset.saturating_add(level.duration_seconds());
                (start, level)
            })
            .collect()
    }

    /// Sum of all level durations
    pub fn total_duration(&self) -> i64 {
        self.levels
            .iter()
            .fold(0i64, |total, level| total.saturating_add(level.duration_seconds()))
    }

    /// Schedule a game gets before anyone configures one
    pub fn default_schedule(level_seconds: i64) -> Self {
        let blinds: [(i64, i64, i64); 10] = [
            (25, 50, 0),
            (50, 100, 0),
            (75, 150, 0),
            (100, 200, 25),
            (150, 300, 25),
            (200, 400, 50),
            (300, 600, 75),
            (400, 800, 100),
            (500, 1000, 100),
            (600, 1200, 200),
        ];

        let mut levels = Vec::with_capacity(blinds.len() + 1);
        for (number, (small, big, ante)) in blinds.iter().enumerate() {
            levels.push(Level::blind((number + 1).to_string(), *small, *big, *ante, level_seconds));
            // Break after the fourth level
            if number == 3 {
                levels.push(Level::break_time("Break", level_seconds));
            }
        }

        Self { levels }
    }
}
