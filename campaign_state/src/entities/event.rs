//! Key events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Priority;
use crate::tags::TagSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub titre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub consequences: String,
    #[serde(default)]
    pub personnages_impliques: Vec<String>,
    #[serde(default)]
    pub lieux_impliques: Vec<String>,
    #[serde(default)]
    pub tags: TagSet,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub priorite: Priority,
}

impl KeyEvent {
    pub fn new(titre: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            titre: titre.into(),
            description: String::new(),
            consequences: String::new(),
            personnages_impliques: Vec::new(),
            lieux_impliques: Vec::new(),
            tags: TagSet::new(),
            date,
            priorite: Priority::default(),
        }
    }

    pub fn apply(&mut self, field: EventField) {
        match field {
            EventField::Titre(v) => self.titre = v,
            EventField::Description(v) => self.description = v,
            EventField::Consequences(v) => self.consequences = v,
            EventField::PersonnagesImpliques(v) => self.personnages_impliques = v,
            EventField::LieuxImpliques(v) => self.lieux_impliques = v,
            EventField::Date(v) => self.date = v,
            EventField::Priorite(v) => self.priorite = Priority::new(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventField {
    Titre(String),
    Description(String),
    Consequences(String),
    PersonnagesImpliques(Vec<String>),
    LieuxImpliques(Vec<String>),
    Date(DateTime<Utc>),
    Priorite(i64),
}
