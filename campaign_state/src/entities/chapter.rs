//! Chapters - the ordered story log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Priority;
use crate::tags::TagSet;

/// Chapter identifier, unique within a campaign and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(pub u32);

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub titre: String,
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub tags: TagSet,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub priorite: Priority,
}

impl Chapter {
    pub fn new(id: ChapterId, titre: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id,
            titre: titre.into(),
            resume: String::new(),
            tags: TagSet::new(),
            date,
            priorite: Priority::default(),
        }
    }

    pub fn apply(&mut self, field: ChapterField) {
        match field {
            ChapterField::Titre(v) => self.titre = v,
            ChapterField::Resume(v) => self.resume = v,
            ChapterField::Date(v) => self.date = v,
            ChapterField::Priorite(v) => self.priorite = Priority::new(v),
        }
    }
}

/// A single editable chapter field.
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterField {
    Titre(String),
    Resume(String),
    Date(DateTime<Utc>),
    Priorite(i64),
}
