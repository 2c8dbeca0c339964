//! The campaign record - the full narrative state of one play session.
//!
//! All mutation goes through the methods in this module so the invariants
//! hold everywhere:
//!
//! - chapter ids are unique and never reassigned, even after deletion
//! - tag collections are trimmed, non-empty and duplicate-free
//! - priorities and evolution speeds stay in range
//! - NPC emotion codes always decode to six clamped axes
//!
//! Missing chapters and out-of-range indices are not errors: the operation
//! returns `false` / `None` and leaves the record untouched.

mod directive;
mod store;

pub use directive::*;
pub use store::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Chapter, ChapterId, KeyEvent, Location, Npc};
use crate::tags::TagSet;

/// Campaign-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMeta {
    pub titre: String,
    #[serde(default)]
    pub resume_global: String,
    pub date_creation: DateTime<Utc>,
    pub date_derniere_sauvegarde: DateTime<Utc>,
}

/// Speaker of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

fn default_memory_enabled() -> bool {
    true
}

/// The mutable narrative state of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub(crate) meta: CampaignMeta,
    #[serde(default)]
    pub(crate) style_narration: String,
    #[serde(default)]
    pub(crate) chapitres: Vec<Chapter>,
    #[serde(default)]
    pub(crate) pnj_importants: Vec<Npc>,
    #[serde(default)]
    pub(crate) lieux_importants: Vec<Location>,
    #[serde(default)]
    pub(crate) evenements_cles: Vec<KeyEvent>,
    #[serde(default)]
    pub(crate) tags_globaux: TagSet,
    #[serde(default = "default_memory_enabled")]
    pub(crate) memory_enabled: bool,
    #[serde(default)]
    pub(crate) messages: Vec<ChatMessage>,

    /// Highest chapter id ever assigned.
    #[serde(default)]
    pub(crate) dernier_id_chapitre: u32,

    /// Names and tags of entities changed since the last `take_touched`.
    #[serde(skip)]
    pub(crate) touched: Vec<String>,
}

impl Campaign {
    /// Create an empty campaign titled `titre`.
    pub fn new(titre: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            meta: CampaignMeta {
                titre: titre.into(),
                resume_global: String::new(),
                date_creation: now,
                date_derniere_sauvegarde: now,
            },
            style_narration: String::new(),
            chapitres: Vec::new(),
            pnj_importants: Vec::new(),
            lieux_importants: Vec::new(),
            evenements_cles: Vec::new(),
            tags_globaux: TagSet::new(),
            memory_enabled: true,
            messages: Vec::new(),
            dernier_id_chapitre: 0,
            touched: Vec::new(),
        }
    }

    /// Title, global summary and save dates.
    pub fn meta(&self) -> &CampaignMeta {
        &self.meta
    }

    pub fn title(&self) -> &str {
        &self.meta.titre
    }

    /// Free-text narration style given to the model.
    pub fn style(&self) -> &str {
        &self.style_narration
    }

    /// Chapters in the order they were added.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapitres
    }

    /// Chapter by its stable id.
    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapitres.iter().find(|c| c.id == id)
    }

    /// NPCs in insertion order; indices shift on delete.
    pub fn npcs(&self) -> &[Npc] {
        &self.pnj_importants
    }

    /// First NPC whose name matches exactly (case-sensitive).
    pub fn npc_by_name(&self, nom: &str) -> Option<&Npc> {
        self.pnj_importants.iter().find(|p| p.nom == nom)
    }

    /// Locations in insertion order; indices shift on delete.
    pub fn locations(&self) -> &[Location] {
        &self.lieux_importants
    }

    /// First location whose name matches exactly (case-sensitive).
    pub fn location_by_name(&self, nom: &str) -> Option<&Location> {
        self.lieux_importants.iter().find(|l| l.nom == nom)
    }

    /// Key events in insertion order.
    pub fn events(&self) -> &[KeyEvent] {
        &self.evenements_cles
    }

    /// Campaign-level tags, matched before any entity.
    pub fn global_tags(&self) -> &TagSet {
        &self.tags_globaux
    }

    /// Whether lore is injected into prompts at all.
    pub fn memory_enabled(&self) -> bool {
        self.memory_enabled
    }

    /// Transcript, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Every tag used anywhere in the campaign, deduplicated, in the order
    /// global, NPCs, locations, chapters, events.
    pub fn available_tags(&self) -> TagSet {
        let mut all = self.tags_globaux.clone();
        for p in &self.pnj_importants {
            all.extend_from(&p.tags);
        }
        for l in &self.lieux_importants {
            all.extend_from(&l.tags);
        }
        for c in &self.chapitres {
            all.extend_from(&c.tags);
        }
        for e in &self.evenements_cles {
            all.extend_from(&e.tags);
        }
        all
    }

    /// Drain the journal of touched entity names and tags.
    pub fn take_touched(&mut self) -> Vec<String> {
        std::mem::take(&mut self.touched)
    }

    pub(crate) fn touch(&mut self, key: &str) {
        if !key.trim().is_empty() && !self.touched.iter().any(|k| k == key) {
            self.touched.push(key.to_string());
        }
    }

    pub(crate) fn touch_all<'a>(&mut self, name: &str, tags: impl IntoIterator<Item = &'a str>) {
        self.touch(name);
        for tag in tags {
            self.touch(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_campaign_is_empty() {
        let campaign = Campaign::new("Aventure", Utc::now());
        assert_eq!(campaign.title(), "Aventure");
        assert!(campaign.memory_enabled());
        assert!(campaign.chapters().is_empty());
        assert!(campaign.npcs().is_empty());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let json = r#"{
            "meta": {
                "titre": "Ancienne",
                "date_creation": "2024-01-01T00:00:00Z",
                "date_derniere_sauvegarde": "2024-01-01T00:00:00Z"
            },
            "pnj_importants": [{ "nom": "Lyna", "tags": ["allié", " allié "] }]
        }"#;
        let campaign: Campaign = serde_json::from_str(json).unwrap();
        assert!(campaign.memory_enabled());
        assert_eq!(campaign.npcs()[0].tags.len(), 1);
        assert_eq!(campaign.npcs()[0].emotion.as_str(), "C50-A30-P50-H10-R50-J10");
    }

    #[test]
    fn test_touched_journal_is_not_serialized() {
        let mut campaign = Campaign::new("Aventure", Utc::now());
        campaign.touch("Lyna");
        let json = serde_json::to_string(&campaign).unwrap();
        assert!(!json.contains("touched"));
        assert_eq!(campaign.take_touched(), vec!["Lyna".to_string()]);
        assert!(campaign.take_touched().is_empty());
    }
}
