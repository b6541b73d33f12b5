//! Named schedule templates

use serde::{Deserialize, Serialize};

use super::Schedule;

/// A reusable schedule template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub levels: Schedule,
}

impl Preset {
    pub fn new(name: impl Into<String>, levels: Schedule) -> Self {
        Self {
            name: name.into(),
            levels,
        }
    }
}

/// Ordered collection of presets.
///
/// Names are not unique; presets are addressed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetBook {
    pub presets: Vec<Preset>,
}

impl PresetBook {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    /// Select a preset by its position in the book
    pub fn select(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
