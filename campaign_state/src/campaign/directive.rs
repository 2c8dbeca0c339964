//! Structured mutations requested by the language model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Campaign;
use crate::emotion::EmotionAxis;
use crate::entities::{EmotionShift, KeyEvent, Location, Npc};
use crate::tags::TagSet;

/// A state mutation extracted from model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    SaveLocation {
        nom: String,
        description: String,
        tags: TagSet,
    },
    SaveNpc {
        nom: String,
        role: String,
        description: String,
        tags: TagSet,
    },
    SaveEvent {
        titre: String,
        description: String,
        consequences: String,
        tags: TagSet,
    },
    SaveChapter {
        titre: String,
        resume: String,
        tags: TagSet,
    },
    UpdateNpcEmotion {
        nom: String,
        /// Axis name as written by the model; validated when applied.
        axis: String,
        delta: i32,
        reason: String,
    },
}

impl Directive {
    /// Whether this creates or merges an entry rather than moving an emotion.
    pub fn is_save(&self) -> bool {
        !matches!(self, Directive::UpdateNpcEmotion { .. })
    }
}

/// Counts of what a batch of directives actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveReport {
    pub saved: usize,
    pub emotion_updates: usize,
    pub skipped: usize,
}

impl DirectiveReport {
    /// Whether any directive actually mutated the campaign.
    pub fn changed_anything(&self) -> bool {
        self.saved > 0 || self.emotion_updates > 0
    }
}

impl Campaign {
    /// Apply model directives. Saves are applied before emotion updates so an
    /// update can target an NPC introduced in the same response. New entries
    /// and history lines are dated `now`.
    pub fn apply_directives(
        &mut self,
        directives: &[Directive],
        now: DateTime<Utc>,
    ) -> DirectiveReport {
        let mut report = DirectiveReport::default();

        for directive in directives.iter().filter(|d| d.is_save()) {
            self.apply_save(directive, now);
            report.saved += 1;
        }

        for directive in directives {
            if let Directive::UpdateNpcEmotion {
                nom,
                axis,
                delta,
                reason,
            } = directive
            {
                let applied = match axis.parse::<EmotionAxis>() {
                    Ok(axis) => self
                        .apply_npc_emotion_update(nom, axis, *delta, reason, now)
                        .is_some(),
                    Err(e) => {
                        warn!(npc = %nom, error = %e, "Ignoring emotion update");
                        false
                    }
                };
                if applied {
                    report.emotion_updates += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }

        debug!(
            saved = report.saved,
            emotion_updates = report.emotion_updates,
            skipped = report.skipped,
            "Applied directives"
        );
        report
    }

    /// Shift one emotion axis of the NPC named `nom` (exact match).
    ///
    /// Unknown names are a data-quality issue in model output, not a fault:
    /// the call is a no-op returning `None`.
    pub fn apply_npc_emotion_update(
        &mut self,
        nom: &str,
        axis: EmotionAxis,
        delta: i32,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Option<EmotionShift> {
        let Some(npc) = self.pnj_importants.iter_mut().find(|p| p.nom == nom) else {
            warn!(npc = %nom, "Emotion update for unknown NPC");
            return None;
        };
        let shift = npc.shift_emotion(axis, delta, reason, now);
        let (name, tags) = (npc.nom.clone(), npc.tags.clone());
        self.touch_all(&name, tags.iter());
        Some(shift)
    }

    /// Upsert one save directive, matching existing entries by exact name or title.
    fn apply_save(&mut self, directive: &Directive, now: DateTime<Utc>) {
        match directive {
            Directive::SaveLocation {
                nom,
                description,
                tags,
            } => {
                match self.lieux_importants.iter_mut().find(|l| l.nom == *nom) {
                    Some(existing) => {
                        existing.description = description.clone();
                        existing.tags.extend_from(tags);
                    }
                    None => self.lieux_importants.push(
                        Location::new(nom.clone())
                            .with_description(description.clone())
                            .with_tags(tags.clone()),
                    ),
                }
                self.touch_all(nom, tags.iter());
            }
            Directive::SaveNpc {
                nom,
                role,
                description,
                tags,
            } => {
                match self.pnj_importants.iter_mut().find(|p| p.nom == *nom) {
                    Some(existing) => {
                        if !role.is_empty() {
                            existing.role = role.clone();
                        }
                        existing.description = description.clone();
                        existing.tags.extend_from(tags);
                    }
                    None => self.pnj_importants.push(
                        Npc::new(nom.clone())
                            .with_role(role.clone())
                            .with_description(description.clone())
                            .with_tags(tags.clone()),
                    ),
                }
                self.touch_all(nom, tags.iter());
            }
            Directive::SaveEvent {
                titre,
                description,
                consequences,
                tags,
            } => {
                match self.evenements_cles.iter_mut().find(|e| e.titre == *titre) {
                    Some(existing) => {
                        existing.description = description.clone();
                        existing.consequences = consequences.clone();
                        existing.tags.extend_from(tags);
                    }
                    None => {
                        let mut event = KeyEvent::new(titre.clone(), now);
                        event.description = description.clone();
                        event.consequences = consequences.clone();
                        event.tags = tags.clone();
                        self.evenements_cles.push(event);
                    }
                }
                self.touch_all(titre, tags.iter());
            }
            Directive::SaveChapter {
                titre,
                resume,
                tags,
            } => {
                match self.chapitres.iter_mut().find(|c| c.titre == *titre) {
                    Some(existing) => {
                        existing.resume = resume.clone();
                        existing.tags.extend_from(tags);
                    }
                    None => {
                        let id = self.add_chapter(now);
                        if let Some(chapter) = self.chapitres.iter_mut().find(|c| c.id == id) {
                            chapter.titre = titre.clone();
                            chapter.resume = resume.clone();
                            chapter.tags = tags.clone();
                        }
                    }
                }
                self.touch_all(titre, tags.iter());
            }
            Directive::UpdateNpcEmotion { .. } => {}
        }
    }
}
