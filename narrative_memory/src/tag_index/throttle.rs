//! Read-frequency gate deciding when a tag's detail is injected again.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::session::SessionId;

/// Read bookkeeping for one (session, tag) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleEntry {
    pub last_read_at: DateTime<Utc>,
    pub read_count: u32,
}

/// One session's throttle state, captured so a turn can be undone.
#[derive(Debug, Clone)]
pub struct ThrottleCheckpoint {
    session: SessionId,
    tags: Option<HashMap<String, ThrottleEntry>>,
}

/// Per-session throttle state. The first reference to a tag surfaces it, the
/// next `surface_every - 1` references are suppressed, and the cycle repeats.
/// A forced tag surfaces on its very next reference.
#[derive(Debug, Clone)]
pub struct ThrottleCache {
    surface_every: u32,
    entries: HashMap<SessionId, HashMap<String, ThrottleEntry>>,
}

impl ThrottleCache {
    pub fn new(surface_every: u32) -> Self {
        Self {
            surface_every: surface_every.max(1),
            entries: HashMap::new(),
        }
    }

    /// Record one reference to `tag` and report whether it should surface.
    pub fn should_surface(&mut self, session: &SessionId, tag: &str, now: DateTime<Utc>) -> bool {
        let tags = self.entries.entry(session.clone()).or_default();
        let Some(entry) = tags.get_mut(tag) else {
            tags.insert(
                tag.to_string(),
                ThrottleEntry {
                    last_read_at: now,
                    read_count: 1,
                },
            );
            return true;
        };

        entry.last_read_at = now;
        if entry.read_count == 0 || entry.read_count >= self.surface_every {
            entry.read_count = 1;
            true
        } else {
            entry.read_count += 1;
            false
        }
    }

    /// Make the next reference to `tag` in `session` surface.
    pub fn force_surface(&mut self, session: &SessionId, tag: &str) {
        if let Some(entry) = self
            .entries
            .get_mut(session)
            .and_then(|tags| tags.get_mut(tag))
        {
            entry.read_count = 0;
        }
    }

    /// Make the next reference to `tag` surface in every session.
    pub fn force_surface_everywhere(&mut self, tag: &str) {
        for tags in self.entries.values_mut() {
            if let Some(entry) = tags.get_mut(tag) {
                entry.read_count = 0;
            }
        }
    }

    pub fn entry(&self, session: &SessionId, tag: &str) -> Option<&ThrottleEntry> {
        self.entries.get(session).and_then(|tags| tags.get(tag))
    }

    pub fn forget_session(&mut self, session: &SessionId) {
        self.entries.remove(session);
    }

    /// Capture `session`'s entries as they are now.
    pub fn checkpoint(&self, session: &SessionId) -> ThrottleCheckpoint {
        ThrottleCheckpoint {
            session: session.clone(),
            tags: self.entries.get(session).cloned(),
        }
    }

    /// Put a session's entries back to a captured state.
    pub fn rollback(&mut self, checkpoint: ThrottleCheckpoint) {
        match checkpoint.tags {
            Some(tags) => {
                self.entries.insert(checkpoint.session, tags);
            }
            None => {
                self.entries.remove(&checkpoint.session);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calls(cache: &mut ThrottleCache, session: &SessionId, n: usize) -> Vec<bool> {
        (0..n)
            .map(|_| cache.should_surface(session, "Lyna", Utc::now()))
            .collect()
    }

    #[test]
    fn test_surfaces_on_first_ninth_seventeenth() {
        let mut cache = ThrottleCache::new(8);
        let session = SessionId::from("s1");
        let results = calls(&mut cache, &session, 17);

        let surfaced: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, s)| **s)
            .map(|(i, _)| i + 1)
            .collect();
        assert_eq!(surfaced, vec![1, 9, 17]);
    }

    #[test]
    fn test_force_surface_resets_cycle() {
        let mut cache = ThrottleCache::new(8);
        let session = SessionId::from("s1");
        calls(&mut cache, &session, 3);

        cache.force_surface(&session, "Lyna");
        assert_eq!(cache.entry(&session, "Lyna").unwrap().read_count, 0);
        assert!(cache.should_surface(&session, "Lyna", Utc::now()));
        assert!(!cache.should_surface(&session, "Lyna", Utc::now()));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut cache = ThrottleCache::new(8);
        let a = SessionId::from("a");
        let b = SessionId::from("b");

        assert!(cache.should_surface(&a, "Lyna", Utc::now()));
        assert!(cache.should_surface(&b, "Lyna", Utc::now()));
        assert!(!cache.should_surface(&a, "Lyna", Utc::now()));

        cache.force_surface_everywhere("Lyna");
        assert!(cache.should_surface(&a, "Lyna", Utc::now()));
        assert!(cache.should_surface(&b, "Lyna", Utc::now()));

        cache.forget_session(&a);
        assert!(cache.entry(&a, "Lyna").is_none());
    }

    #[test]
    fn test_force_unknown_tag_is_noop() {
        let mut cache = ThrottleCache::new(8);
        let session = SessionId::from("s1");
        cache.force_surface(&session, "Inconnu");
        assert!(cache.entry(&session, "Inconnu").is_none());
    }

    #[test]
    fn test_rollback_restores_pending_surface() {
        let mut cache = ThrottleCache::new(8);
        let session = SessionId::from("s1");
        let other = SessionId::from("s2");
        cache.should_surface(&other, "Lyna", Utc::now());

        let checkpoint = cache.checkpoint(&session);
        assert!(cache.should_surface(&session, "Lyna", Utc::now()));
        cache.rollback(checkpoint);
        assert!(cache.entry(&session, "Lyna").is_none());
        assert!(cache.should_surface(&session, "Lyna", Utc::now()));

        let checkpoint = cache.checkpoint(&session);
        calls(&mut cache, &session, 7);
        cache.rollback(checkpoint);
        assert_eq!(cache.entry(&session, "Lyna").unwrap().read_count, 1);
        assert!(cache.entry(&other, "Lyna").is_some());
    }
}
