//! A single stage of the tournament clock

use serde::{Deserialize, Serialize};

/// One entry of a blind schedule: either a blind period or a break.
///
/// Blind amounts are signed so that malformed input survives
/// deserialization and is rejected by schedule validation with a
/// precise reason instead of an opaque parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Level {
    Blind {
        /// Level number as shown to players
        label: String,
        small_blind: i64,
        big_blind: i64,
        #[serde(default)]
        ante: i64,
        duration_seconds: i64,
    },
    Break {
        /// Display name of the break
        #[serde(default = "default_break_label")]
        label: String,
        duration_seconds: i64,
    },
}

fn default_break_label() -> String {
    "Break".to_string()
}

impl Level {
    /// Create a blind level
    pub fn blind(
        label: impl Into<String>,
        small_blind: i64,
        big_blind: i64,
        ante: i64,
        duration_seconds: i64,
    ) -> Self {
        Level::Blind {
            label: label.into(),
            small_blind,
            big_blind,
            ante,
            duration_seconds,
        }
    }

    /// Create a break
    pub fn break_time(label: impl Into<String>, duration_seconds: i64) -> Self {
        Level::Break {
            label: label.into(),
            duration_seconds,
        }
    }

    /// Wall-clock length of this level in seconds
    pub fn duration_seconds(&self) -> i64 {
        match self {
            Level::Blind { duration_seconds, .. } | Level::Break { duration_seconds, .. } => {
                *duration_seconds
            }
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Level::Break { .. })
    }

    /// Blind triple `(small, big, ante)`, absent for breaks
    pub fn blinds(&self) -> Option<(i64, i64, i64)> {
        match self {
            Level::Blind {
                small_blind,
                big_blind,
                ante,
                ..
            } => Some((*small_blind, *big_blind, *ante)),
            Level::Break { .. } => None,
        }
    }
}
