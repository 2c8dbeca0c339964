//! Important non-player characters.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{EvolutionSpeed, Priority};
use crate::emotion::{EmotionAxis, EmotionCode};
use crate::tags::TagSet;

/// An important NPC. `nom` is the display key; it is not guaranteed unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub nom: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub emotion: EmotionCode,
    #[serde(default)]
    pub caractere: String,
    #[serde(default)]
    pub valeurs: String,
    #[serde(default)]
    pub peurs: String,
    #[serde(default)]
    pub desirs: String,
    /// Append-only log of what happened to this character.
    #[serde(default)]
    pub histoire: String,
    #[serde(default)]
    pub vitesse_evolution: EvolutionSpeed,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub priorite: Priority,
}

impl Npc {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            role: String::new(),
            description: String::new(),
            emotion: EmotionCode::default(),
            caractere: String::new(),
            valeurs: String::new(),
            peurs: String::new(),
            desirs: String::new(),
            histoire: String::new(),
            vitesse_evolution: EvolutionSpeed::default(),
            tags: TagSet::new(),
            priorite: Priority::default(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.vitesse_evolution = EvolutionSpeed::new(speed);
        self
    }

    pub fn apply(&mut self, field: NpcField) {
        match field {
            NpcField::Nom(v) => self.nom = v,
            NpcField::Role(v) => self.role = v,
            NpcField::Description(v) => self.description = v,
            // Stored re-encoded so the code is always canonical.
            NpcField::Emotion(v) => self.emotion = EmotionCode::from(v.vector()),
            NpcField::Caractere(v) => self.caractere = v,
            NpcField::Valeurs(v) => self.valeurs = v,
            NpcField::Peurs(v) => self.peurs = v,
            NpcField::Desirs(v) => self.desirs = v,
            NpcField::Histoire(v) => self.histoire = v,
            NpcField::VitesseEvolution(v) => self.vitesse_evolution = EvolutionSpeed::new(v),
            NpcField::Priorite(v) => self.priorite = Priority::new(v),
        }
    }

    /// Shift one emotion axis by `delta` scaled by this NPC's evolution speed,
    /// and log the change in `histoire`.
    pub fn shift_emotion(
        &mut self,
        axis: EmotionAxis,
        delta: i32,
        reason: &str,
        at: DateTime<Utc>,
    ) -> EmotionShift {
        let applied = (delta as f32 * self.vitesse_evolution.get()).round() as i64;

        let mut vector = self.emotion.vector();
        let previous = vector.get(axis);
        let current = vector.shift(axis, applied);
        self.emotion = EmotionCode::from(vector);

        self.append_history(
            at,
            &format!("{reason}: {axis} {applied:+} ({previous} -> {current})"),
        );

        EmotionShift {
            axis,
            previous,
            current,
            applied_delta: applied,
        }
    }

    /// Append a dated line to `histoire`.
    pub fn append_history(&mut self, at: DateTime<Utc>, line: &str) {
        if !self.histoire.is_empty() {
            self.histoire.push('\n');
        }
        self.histoire.push_str(&format!(
            "[{}] {}",
            at.to_rfc3339_opts(SecondsFormat::Secs, true),
            line
        ));
    }
}

/// A single editable NPC field.
#[derive(Debug, Clone, PartialEq)]
pub enum NpcField {
    Nom(String),
    Role(String),
    Description(String),
    Emotion(EmotionCode),
    Caractere(String),
    Valeurs(String),
    Peurs(String),
    Desirs(String),
    Histoire(String),
    VitesseEvolution(f32),
    Priorite(i64),
}

/// Outcome of an emotion update on one NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionShift {
    pub axis: EmotionAxis,
    pub previous: u8,
    pub current: u8,
    /// The delta after scaling by the NPC's evolution speed.
    pub applied_delta: i64,
}
