//! Tag index - which campaign entities a free-text message refers to.
//!
//! Matching is a case-insensitive substring test of the message against
//! global tags, NPC names and location names, scanned in that order. A matched
//! NPC or location also contributes all of its own tags. The result keeps the
//! first `max_tags` distinct hits; both the order and the cap bound how much
//! lore a single message can pull into the prompt.

mod throttle;

pub use throttle::*;

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use campaign_state::Campaign;

use crate::config::MemoryConfig;
use crate::session::SessionId;

/// Tags referenced by `message`, at most `max_tags` of them.
pub fn find_referenced_tags(campaign: &Campaign, message: &str, max_tags: usize) -> Vec<String> {
    let mut found = Vec::new();
    if message.is_empty() || max_tags == 0 {
        return found;
    }
    let haystack = message.to_lowercase();
    let mentions = |needle: &str| !needle.is_empty() && haystack.contains(&needle.to_lowercase());

    for tag in campaign.global_tags().iter() {
        if mentions(tag) {
            push(tag, &mut found);
        }
    }

    for npc in campaign.npcs() {
        if mentions(&npc.nom) {
            push(&npc.nom, &mut found);
            for tag in npc.tags.iter() {
                push(tag, &mut found);
            }
        }
    }

    for location in campaign.locations() {
        if mentions(&location.nom) {
            push(&location.nom, &mut found);
            for tag in location.tags.iter() {
                push(tag, &mut found);
            }
        }
    }

    found.truncate(max_tags);
    found
}

fn push(tag: &str, found: &mut Vec<String>) {
    if !found.iter().any(|t| t == tag) {
        found.push(tag.to_string());
    }
}

#[derive(Debug, Clone)]
struct CachedLookup {
    at: DateTime<Utc>,
    tags: Vec<String>,
}

/// Per-session tag lookup with a short-lived cache keyed on the literal
/// message text.
///
/// The cache only saves rescans; any session whose campaign changes should be
/// invalidated so edited lore is matched immediately.
#[derive(Debug, Clone)]
pub struct TagIndex {
    max_tags: usize,
    ttl: Duration,
    cache: HashMap<SessionId, HashMap<String, CachedLookup>>,
}

impl TagIndex {
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            max_tags: config.max_referenced_tags,
            ttl: Duration::seconds(config.message_cache_ttl_secs),
            cache: HashMap::new(),
        }
    }

    /// Referenced tags for `message`, reusing a lookup made within the cache window.
    pub fn lookup(
        &mut self,
        session: &SessionId,
        campaign: &Campaign,
        message: &str,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let ttl = self.ttl;
        let entries = self.cache.entry(session.clone()).or_default();
        entries.retain(|_, cached| now - cached.at < ttl);

        if let Some(cached) = entries.get(message) {
            debug!(session_id = %session, "Tag lookup served from cache");
            return cached.tags.clone();
        }

        let tags = find_referenced_tags(campaign, message, self.max_tags);
        entries.insert(
            message.to_string(),
            CachedLookup {
                at: now,
                tags: tags.clone(),
            },
        );
        tags
    }

    pub fn invalidate(&mut self, session: &SessionId) {
        self.cache.remove(session);
    }

    pub fn cached_messages(&self, session: &SessionId) -> usize {
        self.cache.get(session).map_or(0, HashMap::len)
    }
}
