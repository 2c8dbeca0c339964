//! Context Composer - Builds the campaign digest injected into the prompt.
//!
//! The digest is assembled in a fixed order:
//! 1. **Title**: always present, even when memory is disabled
//! 2. **Summary**: the global résumé, when set
//! 3. **Listings**: the most recent chapters, then the first NPCs and locations
//! 4. **Recent context**: for each surfaced tag, the locations and NPCs it matches
//!
//! The per-section item cap is the only thing bounding the size of the digest.

use serde::{Deserialize, Serialize};

use campaign_state::{Campaign, TagSet};

/// Context used when no session is active.
pub const NO_CAMPAIGN_CONTEXT: &str = "Aucun contexte de campagne.";

const UNTITLED: &str = "Sans titre";

/// A capped listing of one entity collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedSection {
    /// Size of the whole collection, not just the listed part.
    pub total: usize,
    pub entries: Vec<String>,
}

impl ListedSection {
    fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Entities matching one surfaced tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDetail {
    pub tag: String,
    pub locations: Vec<String>,
    pub npcs: Vec<String>,
}

/// The composed digest, kept structured until it is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedContext {
    pub title: String,
    pub summary: Option<String>,
    pub chapters: ListedSection,
    pub npcs: ListedSection,
    pub locations: ListedSection,
    pub tag_details: Vec<TagDetail>,
}

impl ComposedContext {
    /// Format the context as a prompt block.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!("CAMPAGNE: {}\n\n", self.title));

        if let Some(summary) = &self.summary {
            prompt.push_str(&format!("RÉSUMÉ: {}\n\n", summary));
        }

        push_section(&mut prompt, "CHAPITRES", &self.chapters);
        push_section(&mut prompt, "PNJ IMPORTANTS", &self.npcs);
        push_section(&mut prompt, "LIEUX", &self.locations);

        if !self.tag_details.is_empty() {
            prompt.push_str("\n// CONTEXTE RÉCENT:\n");
            for detail in &self.tag_details {
                if !detail.locations.is_empty() {
                    prompt.push_str(&format!(
                        "LIEUX[{}]: {}\n",
                        detail.tag,
                        detail.locations.join(", ")
                    ));
                }
                if !detail.npcs.is_empty() {
                    prompt.push_str(&format!("PNJ[{}]: {}\n", detail.tag, detail.npcs.join(", ")));
                }
            }
        }

        prompt
    }
}

fn push_section(prompt: &mut String, header: &str, section: &ListedSection) {
    if section.is_empty() {
        return;
    }
    prompt.push_str(&format!("{} ({}):\n", header, section.total));
    for entry in &section.entries {
        prompt.push_str(&format!("- {}\n", entry));
    }
    prompt.push('\n');
}

/// Builds [`ComposedContext`] values from a campaign and the tags allowed to surface.
#[derive(Debug, Clone)]
pub struct ContextComposer {
    recent_items: usize,
}

impl ContextComposer {
    pub fn new(recent_items: usize) -> Self {
        Self { recent_items }
    }

    /// Compose the digest of `campaign`. `surfaced` holds the referenced tags
    /// that passed the throttle, in lookup order.
    pub fn compose(&self, campaign: &Campaign, surfaced: &[String]) -> ComposedContext {
        let title = match campaign.title() {
            "" => UNTITLED.to_string(),
            t => t.to_string(),
        };

        if !campaign.memory_enabled() {
            return ComposedContext {
                title,
                ..Default::default()
            };
        }

        let summary = Some(campaign.meta().resume_global.clone()).filter(|s| !s.is_empty());

        let chapters = campaign.chapters();
        let skip = chapters.len().saturating_sub(self.recent_items);
        let chapters = ListedSection {
            total: chapters.len(),
            entries: chapters[skip..]
                .iter()
                .map(|c| format!("{}: {}", c.titre, c.resume))
                .collect(),
        };

        let npcs = ListedSection {
            total: campaign.npcs().len(),
            entries: campaign
                .npcs()
                .iter()
                .take(self.recent_items)
                .map(|p| format!("{} ({}): {}", p.nom, p.role, p.description))
                .collect(),
        };

        let locations = ListedSection {
            total: campaign.locations().len(),
            entries: campaign
                .locations()
                .iter()
                .take(self.recent_items)
                .map(|l| format!("{}: {}", l.nom, l.description))
                .collect(),
        };

        let tag_details = surfaced
            .iter()
            .map(|tag| Self::tag_detail(campaign, tag))
            .collect();

        ComposedContext {
            title,
            summary,
            chapters,
            npcs,
            locations,
            tag_details,
        }
    }

    /// An entity matches a tag when it carries the tag or its name contains it.
    fn tag_detail(campaign: &Campaign, tag: &str) -> TagDetail {
        let needle = tag.to_lowercase();
        let matches = |nom: &str, tags: &TagSet| {
            tags.contains(tag) || nom.to_lowercase().contains(&needle)
        };

        TagDetail {
            tag: tag.to_string(),
            locations: campaign
                .locations()
                .iter()
                .filter(|l| matches(&l.nom, &l.tags))
                .map(|l| l.nom.clone())
                .collect(),
            npcs: campaign
                .npcs()
                .iter()
                .filter(|p| matches(&p.nom, &p.tags))
                .map(|p| p.nom.clone())
                .collect(),
        }
    }
}

impl Default for ContextComposer {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_state::{ChapterField, Location, Npc};
    use chrono::Utc;

    fn setup_campaign() -> Campaign {
        let mut c = Campaign::new("La Quête", Utc::now());
        c.set_summary("Les héros cherchent l'artefact.");
        for i in 1..=4 {
            let id = c.add_chapter(Utc::now());
            c.update_chapter(id, ChapterField::Titre(format!("Chapitre {i}")));
            c.update_chapter(id, ChapterField::Resume(format!("Résumé {i}")));
        }
        for nom in ["Lyna", "Brak", "Zora", "Odo"] {
            c.push_npc(
                Npc::new(nom)
                    .with_role("Guide")
                    .with_description("Discret")
                    .with_tags(TagSet::parse_list("forêt")),
            );
        }
        c.push_location(Location::new("Forêt Noire").with_description("Sombre"));
        c
    }

    #[test]
    fn test_compose_caps_each_listing() {
        let context = ContextComposer::default().compose(&setup_campaign(), &[]);

        assert_eq!(context.chapters.total, 4);
        assert_eq!(
            context.chapters.entries,
            vec!["Chapitre 2: Résumé 2", "Chapitre 3: Résumé 3", "Chapitre 4: Résumé 4"]
        );
        assert_eq!(context.npcs.total, 4);
        assert_eq!(context.npcs.entries.len(), 3);
        assert_eq!(context.npcs.entries[0], "Lyna (Guide): Discret");
        assert_eq!(context.locations.entries, vec!["Forêt Noire: Sombre"]);
    }

    #[test]
    fn test_prompt_string_layout() {
        let mut c = Campaign::new("La Quête", Utc::now());
        c.set_summary("Un résumé");
        c.push_location(Location::new("Forêt Noire").with_description("Sombre"));

        let prompt = ContextComposer::default()
            .compose(&c, &[])
            .to_prompt_string();
        assert_eq!(
            prompt,
            "CAMPAGNE: La Quête\n\nRÉSUMÉ: Un résumé\n\nLIEUX (1):\n- Forêt Noire: Sombre\n\n"
        );
    }

    #[test]
    fn test_surfaced_tags_list_matching_entities() {
        let c = setup_campaign();
        let prompt = ContextComposer::default()
            .compose(&c, &["forêt".to_string(), "inconnu".to_string()])
            .to_prompt_string();

        assert!(prompt.contains("\n// CONTEXTE RÉCENT:\n"));
        assert!(prompt.contains("LIEUX[forêt]: Forêt Noire\n"));
        assert!(prompt.contains("PNJ[forêt]: Lyna, Brak, Zora, Odo\n"));
        assert!(!prompt.contains("[inconnu]"));
    }

    #[test]
    fn test_memory_disabled_emits_only_title() {
        let mut c = setup_campaign();
        c.set_memory_enabled(false);

        let prompt = ContextComposer::default()
            .compose(&c, &["forêt".to_string()])
            .to_prompt_string();
        assert_eq!(prompt, "CAMPAGNE: La Quête\n\n");
    }

    #[test]
    fn test_empty_title_falls_back() {
        let c = Campaign::new("", Utc::now());
        let context = ContextComposer::default().compose(&c, &[]);
        assert_eq!(context.title, "Sans titre");
        assert!(context.summary.is_none());
    }
}
