//! Presentation thresholds for emotion values and evolution speed.

use serde::{Deserialize, Serialize};

/// Qualitative level of an emotion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmotionLevel {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl EmotionLevel {
    /// Boundaries at 80 / 60 / 40 / 20.
    pub fn describe(value: i32) -> Self {
        match value {
            v if v >= 80 => EmotionLevel::VeryHigh,
            v if v >= 60 => EmotionLevel::High,
            v if v >= 40 => EmotionLevel::Medium,
            v if v >= 20 => EmotionLevel::Low,
            _ => EmotionLevel::VeryLow,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EmotionLevel::VeryHigh => "Très élevé",
            EmotionLevel::High => "Élevé",
            EmotionLevel::Medium => "Moyen",
            EmotionLevel::Low => "Faible",
            EmotionLevel::VeryLow => "Très faible",
        }
    }
}

/// Display colour bucket of an emotion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorCategory {
    Green,
    Yellow,
    Orange,
    Red,
}

impl ColorCategory {
    /// Boundaries at 75 / 50 / 25.
    pub fn for_value(value: i32) -> Self {
        match value {
            v if v >= 75 => ColorCategory::Green,
            v if v >= 50 => ColorCategory::Yellow,
            v if v >= 25 => ColorCategory::Orange,
            _ => ColorCategory::Red,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            ColorCategory::Green => "text-green-300",
            ColorCategory::Yellow => "text-yellow-300",
            ColorCategory::Orange => "text-orange-300",
            ColorCategory::Red => "text-red-300",
        }
    }
}

/// How fast an NPC's emotions move, from `vitesse_evolution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionPace {
    Fast,
    Normal,
    Slow,
}

impl EvolutionPace {
    pub fn describe(speed: f32) -> Self {
        if speed >= 1.5 {
            EvolutionPace::Fast
        } else if speed >= 1.0 {
            EvolutionPace::Normal
        } else {
            EvolutionPace::Slow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EvolutionPace::Fast => "Rapide",
            EvolutionPace::Normal => "Normal",
            EvolutionPace::Slow => "Lent",
        }
    }
}
