//! Entity definitions for the campaign record.
//!
//! Field names follow the persisted campaign format (`titre`, `resume`,
//! `pnj_importants`, ...), which other tools read and write.

mod chapter;
mod event;
mod location;
mod npc;

pub use chapter::*;
pub use event::*;
pub use location::*;
pub use npc::*;

use serde::{Deserialize, Serialize};

/// Narrative priority, always within `[1, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(5)
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        i64::from(priority.0)
    }
}

/// Multiplier applied to emotion deltas, always within `[0.1, 2.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct EvolutionSpeed(f32);

impl EvolutionSpeed {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 2.0;

    /// Clamp into range; NaN falls back to the default speed.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self::default()
        } else {
            Self(value.clamp(Self::MIN, Self::MAX))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for EvolutionSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl From<f64> for EvolutionSpeed {
    fn from(value: f64) -> Self {
        Self::new(value as f32)
    }
}

impl From<EvolutionSpeed> for f64 {
    fn from(speed: EvolutionSpeed) -> Self {
        f64::from(speed.0)
    }
}
