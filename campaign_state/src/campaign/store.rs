//! Editor operations on the campaign record.
//!
//! Chapters are addressed by id. NPCs, locations and events are addressed by
//! their position in the collection, so an index is only valid until the next
//! deletion in that collection.

use chrono::{DateTime, Utc};

use super::{Campaign, ChatMessage};
use crate::entities::{
    Chapter, ChapterField, ChapterId, EventField, KeyEvent, Location, LocationField, Npc, NpcField,
};
use crate::tags::TagSet;

/// Address of one tag collection inside the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagTarget {
    Global,
    Chapter(ChapterId),
    Npc(usize),
    Location(usize),
    Event(usize),
}

impl Campaign {
    // -------------------------------------------------------------------------
    // Meta
    // -------------------------------------------------------------------------

    /// Rename the campaign. The session name is not affected.
    pub fn set_title(&mut self, titre: impl Into<String>) {
        self.meta.titre = titre.into();
    }

    /// Replace the global résumé shown at the top of the composed context.
    pub fn set_summary(&mut self, resume: impl Into<String>) {
        self.meta.resume_global = resume.into();
    }

    /// Set the narration style passed to the model with every turn.
    pub fn set_style(&mut self, style: impl Into<String>) {
        self.style_narration = style.into();
    }

    /// When disabled, the composed context is reduced to the title.
    pub fn set_memory_enabled(&mut self, enabled: bool) {
        self.memory_enabled = enabled;
    }

    /// Stamp the last-save date.
    pub fn mark_saved(&mut self, at: DateTime<Utc>) {
        self.meta.date_derniere_sauvegarde = at;
    }

    // -------------------------------------------------------------------------
    // Chapters
    // -------------------------------------------------------------------------

    /// Append an empty chapter dated `now` and return its fresh id.
    pub fn add_chapter(&mut self, now: DateTime<Utc>) -> ChapterId {
        let id = self.next_chapter_id();
        self.chapitres.push(Chapter::new(id, "Nouveau chapitre", now));
        id
    }

    /// Apply one field change to chapter `id`. Returns `false` if it does not exist.
    pub fn update_chapter(&mut self, id: ChapterId, field: ChapterField) -> bool {
        let Some(chapter) = self.chapitres.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        chapter.apply(field);
        let (name, tags) = (chapter.titre.clone(), chapter.tags.clone());
        self.touch_all(&name, tags.iter());
        true
    }

    /// Remove chapter `id`. Its id is never handed out again.
    pub fn delete_chapter(&mut self, id: ChapterId) -> bool {
        let Some(pos) = self.chapitres.iter().position(|c| c.id == id) else {
            return false;
        };
        let removed = self.chapitres.remove(pos);
        self.touch_all(&removed.titre, removed.tags.iter());
        true
    }

    /// `max(every id ever assigned, 0) + 1`.
    fn next_chapter_id(&mut self) -> ChapterId {
        let highest = self
            .chapitres
            .iter()
            .map(|c| c.id.0)
            .max()
            .unwrap_or(0)
            .max(self.dernier_id_chapitre);
        self.dernier_id_chapitre = highest + 1;
        ChapterId(self.dernier_id_chapitre)
    }

    // -------------------------------------------------------------------------
    // NPCs
    // -------------------------------------------------------------------------

    /// Append a placeholder NPC and return its index.
    pub fn add_npc(&mut self) -> usize {
        self.push_npc(Npc::new("Nouveau PNJ"))
    }

    /// Append `npc` and return its index.
    pub fn push_npc(&mut self, npc: Npc) -> usize {
        self.touch_all(&npc.nom, npc.tags.iter());
        self.pnj_importants.push(npc);
        self.pnj_importants.len() - 1
    }

    /// Apply one field change to the NPC at `index`. Returns `false` if out of range.
    pub fn update_npc(&mut self, index: usize, field: NpcField) -> bool {
        let Some(npc) = self.pnj_importants.get_mut(index) else {
            return false;
        };
        npc.apply(field);
        let (name, tags) = (npc.nom.clone(), npc.tags.clone());
        self.touch_all(&name, tags.iter());
        true
    }

    /// Remove the NPC at `index`, shifting later NPCs down by one.
    pub fn delete_npc(&mut self, index: usize) -> bool {
        if index >= self.pnj_importants.len() {
            return false;
        }
        let removed = self.pnj_importants.remove(index);
        self.touch_all(&removed.nom, removed.tags.iter());
        true
    }

    // -------------------------------------------------------------------------
    // Locations
    // -------------------------------------------------------------------------

    /// Append a placeholder location and return its index.
    pub fn add_location(&mut self) -> usize {
        self.push_location(Location::new("Nouveau lieu"))
    }

    /// Append `location` and return its index.
    pub fn push_location(&mut self, location: Location) -> usize {
        self.touch_all(&location.nom, location.tags.iter());
        self.lieux_importants.push(location);
        self.lieux_importants.len() - 1
    }

    /// Apply one field change to the location at `index`. Returns `false` if out of range.
    pub fn update_location(&mut self, index: usize, field: LocationField) -> bool {
        let Some(location) = self.lieux_importants.get_mut(index) else {
            return false;
        };
        location.apply(field);
        let (name, tags) = (location.nom.clone(), location.tags.clone());
        self.touch_all(&name, tags.iter());
        true
    }

    /// Remove the location at `index`, shifting later locations down by one.
    pub fn delete_location(&mut self, index: usize) -> bool {
        if index >= self.lieux_importants.len() {
            return false;
        }
        let removed = self.lieux_importants.remove(index);
        self.touch_all(&removed.nom, removed.tags.iter());
        true
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Append a placeholder event dated `now` and return its index.
    pub fn add_event(&mut self, now: DateTime<Utc>) -> usize {
        self.push_event(KeyEvent::new("Nouvel événement", now))
    }

    /// Append `event` and return its index.
    pub fn push_event(&mut self, event: KeyEvent) -> usize {
        self.touch_all(&event.titre, event.tags.iter());
        self.evenements_cles.push(event);
        self.evenements_cles.len() - 1
    }

    /// Apply one field change to the event at `index`. Returns `false` if out of range.
    pub fn update_event(&mut self, index: usize, field: EventField) -> bool {
        let Some(event) = self.evenements_cles.get_mut(index) else {
            return false;
        };
        event.apply(field);
        let (name, tags) = (event.titre.clone(), event.tags.clone());
        self.touch_all(&name, tags.iter());
        true
    }

    /// Remove the event at `index`, shifting later events down by one.
    pub fn delete_event(&mut self, index: usize) -> bool {
        if index >= self.evenements_cles.len() {
            return false;
        }
        let removed = self.evenements_cles.remove(index);
        self.touch_all(&removed.titre, removed.tags.iter());
        true
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    /// Add a tag to a collection. Returns whether the collection changed.
    pub fn add_tag(&mut self, target: TagTarget, tag: &str) -> bool {
        let (owner, added) = match self.tag_collection_mut(target) {
            Some((owner, tags)) => (owner, tags.insert(tag)),
            None => return false,
        };
        if added {
            self.touch_all(&owner, [tag.trim()]);
        }
        added
    }

    /// Remove a tag from a collection. Returns whether the collection changed.
    pub fn remove_tag(&mut self, target: TagTarget, tag: &str) -> bool {
        let (owner, removed) = match self.tag_collection_mut(target) {
            Some((owner, tags)) => (owner, tags.remove(tag)),
            None => return false,
        };
        if removed {
            self.touch_all(&owner, [tag.trim()]);
        }
        removed
    }

    /// Replace the curated campaign-level tags.
    pub fn set_global_tags(&mut self, tags: TagSet) {
        let old = std::mem::replace(&mut self.tags_globaux, tags);
        let changed: Vec<String> = old
            .iter()
            .chain(self.tags_globaux.iter())
            .map(str::to_string)
            .collect();
        for tag in &changed {
            self.touch(tag);
        }
    }

    /// Restore the stock global tag palette.
    pub fn reset_global_tags(&mut self) {
        self.set_global_tags(TagSet::default_palette());
    }

    fn tag_collection_mut(&mut self, target: TagTarget) -> Option<(String, &mut TagSet)> {
        match target {
            TagTarget::Global => Some((String::new(), &mut self.tags_globaux)),
            TagTarget::Chapter(id) => self
                .chapitres
                .iter_mut()
                .find(|c| c.id == id)
                .map(|c| (c.titre.clone(), &mut c.tags)),
            TagTarget::Npc(i) => self
                .pnj_importants
                .get_mut(i)
                .map(|p| (p.nom.clone(), &mut p.tags)),
            TagTarget::Location(i) => self
                .lieux_importants
                .get_mut(i)
                .map(|l| (l.nom.clone(), &mut l.tags)),
            TagTarget::Event(i) => self
                .evenements_cles
                .get_mut(i)
                .map(|e| (e.titre.clone(), &mut e.tags)),
        }
    }

    // -------------------------------------------------------------------------
    // Transcript
    // -------------------------------------------------------------------------

    /// Append one turn to the transcript.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replace the whole transcript.
    pub fn set_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }
}
