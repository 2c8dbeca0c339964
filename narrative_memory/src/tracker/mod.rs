//! Importance tracker - which entities keep coming up in play.
//!
//! Each entry holds a JSON snapshot of the entity as it was last seen, so
//! a caller can show or reuse the lore even after the campaign moved on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use campaign_state::Campaign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Npc,
    Location,
    Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedElement {
    pub kind: ElementKind,
    pub name: String,
    pub snapshot: Value,
    pub mentions: u32,
    pub last_seen: DateTime<Utc>,
}

/// Mention counts and snapshots for one session.
#[derive(Debug, Clone, Default)]
pub struct ImportanceTracker {
    elements: HashMap<(ElementKind, String), TrackedElement>,
}

impl ImportanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sighting of an entity, refreshing its snapshot.
    pub fn track(&mut self, kind: ElementKind, name: &str, snapshot: Value, now: DateTime<Utc>) {
        let entry = self
            .elements
            .entry((kind, name.to_string()))
            .or_insert_with(|| TrackedElement {
                kind,
                name: name.to_string(),
                snapshot: Value::Null,
                mentions: 0,
                last_seen: now,
            });
        entry.snapshot = snapshot;
        entry.mentions += 1;
        entry.last_seen = now;
    }

    /// Track every entity whose name equals one of `tags`, ignoring case.
    pub fn track_mentions(&mut self, campaign: &Campaign, tags: &[String], now: DateTime<Utc>) {
        for tag in tags {
            let tag = tag.to_lowercase();
            self.track_matching(campaign, now, |name| name.to_lowercase() == tag);
        }
    }

    /// Track entities named exactly as one of the touched keys.
    pub fn track_touched(&mut self, campaign: &Campaign, keys: &[String], now: DateTime<Utc>) {
        for key in keys {
            self.track_matching(campaign, now, |name| name == key.as_str());
        }
    }

    fn track_matching(
        &mut self,
        campaign: &Campaign,
        now: DateTime<Utc>,
        matches: impl Fn(&str) -> bool,
    ) {
        if let Some(npc) = campaign.npcs().iter().find(|p| matches(&p.nom)) {
            self.track(ElementKind::Npc, &npc.nom, snapshot(npc), now);
        }
        if let Some(location) = campaign.locations().iter().find(|l| matches(&l.nom)) {
            self.track(ElementKind::Location, &location.nom, snapshot(location), now);
        }
        if let Some(event) = campaign.events().iter().find(|e| matches(&e.titre)) {
            self.track(ElementKind::Event, &event.titre, snapshot(event), now);
        }
    }

    pub fn get(&self, kind: ElementKind, name: &str) -> Option<&TrackedElement> {
        self.elements.get(&(kind, name.to_string()))
    }

    /// Most mentioned first; ties go to the most recently seen.
    pub fn ranked(&self, limit: usize) -> Vec<&TrackedElement> {
        let mut ranked: Vec<_> = self.elements.values().collect();
        ranked.sort_by(|a, b| {
            b.mentions
                .cmp(&a.mentions)
                .then_with(|| b.last_seen.cmp(&a.last_seen))
        });
        ranked.truncate(limit);
        ranked
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn snapshot<T: Serialize>(entity: &T) -> Value {
    serde_json::to_value(entity).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_state::{KeyEvent, Location, Npc};
    use chrono::Duration;

    fn campaign() -> Campaign {
        let now = Utc::now();
        let mut c = Campaign::new("Test", now);
        c.push_npc(Npc::new("Lyna").with_role("Archère"));
        c.push_location(Location::new("Forêt Noire"));
        c.push_event(KeyEvent::new("L'Attaque", now));
        c
    }

    #[test]
    fn test_mentions_match_names_ignoring_case() {
        let c = campaign();
        let mut tracker = ImportanceTracker::new();
        let now = Utc::now();

        tracker.track_mentions(&c, &["lyna".into(), "forêt noire".into(), "forêt".into()], now);

        assert_eq!(tracker.len(), 2);
        let lyna = tracker.get(ElementKind::Npc, "Lyna").unwrap();
        assert_eq!(lyna.mentions, 1);
        assert_eq!(lyna.snapshot["role"], "Archère");
        assert!(tracker.get(ElementKind::Location, "Forêt Noire").is_some());
    }

    #[test]
    fn test_touched_keys_match_exactly() {
        let c = campaign();
        let mut tracker = ImportanceTracker::new();

        tracker.track_touched(&c, &["L'Attaque".into(), "lyna".into()], Utc::now());

        assert!(tracker.get(ElementKind::Event, "L'Attaque").is_some());
        assert!(tracker.get(ElementKind::Npc, "Lyna").is_none());
    }

    #[test]
    fn test_ranking_by_mentions_then_recency() {
        let c = campaign();
        let mut tracker = ImportanceTracker::new();
        let t0 = Utc::now();

        tracker.track_mentions(&c, &["Lyna".into()], t0);
        tracker.track_mentions(&c, &["Lyna".into()], t0);
        tracker.track_mentions(&c, &["L'Attaque".into()], t0);
        tracker.track_mentions(&c, &["Forêt Noire".into()], t0 + Duration::seconds(1));

        let ranked: Vec<_> = tracker.ranked(3).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(ranked, vec!["Lyna", "Forêt Noire", "L'Attaque"]);
        assert_eq!(tracker.ranked(1).len(), 1);
    }

    #[test]
    fn test_snapshot_is_refreshed() {
        let mut c = campaign();
        let mut tracker = ImportanceTracker::new();
        tracker.track_mentions(&c, &["Lyna".into()], Utc::now());

        c.update_npc(0, campaign_state::NpcField::Role("Reine".into()));
        tracker.track_touched(&c, &["Lyna".into()], Utc::now());

        let lyna = tracker.get(ElementKind::Npc, "Lyna").unwrap();
        assert_eq!(lyna.mentions, 2);
        assert_eq!(lyna.snapshot["role"], "Reine");
    }
}
