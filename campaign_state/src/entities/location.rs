//! Important locations.

use serde::{Deserialize, Serialize};

use super::Priority;
use crate::tags::TagSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub nom: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default)]
    pub priorite: Priority,
}

impl Location {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            description: String::new(),
            tags: TagSet::new(),
            priorite: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn apply(&mut self, field: LocationField) {
        match field {
            LocationField::Nom(v) => self.nom = v,
            LocationField::Description(v) => self.description = v,
            LocationField::Priorite(v) => self.priorite = Priority::new(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationField {
    Nom(String),
    Description(String),
    Priorite(i64),
}
