//! Turn orchestration - one player message in, one game-master reply out.
//!
//! A turn runs in this order:
//! 1. **Lookup**: find the tags the message refers to (cached per session)
//! 2. **Track**: count mentions of the matching entities
//! 3. **Throttle**: keep only the tags due to surface again
//! 4. **Compose**: build the campaign digest and the prompt turns
//! 5. **Complete**: call the language model
//! 6. **Apply**: strip and apply directives, record both turns, persist
//!
//! Stages 2 and 3 advance per-session counters before the model is called.
//! They are checkpointed first and rolled back if the completion fails, so a
//! failed turn leaves the session, its throttle and its tracker as they were.

mod prompt;

pub use prompt::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use campaign_state::{Campaign, ChatMessage, Directive};

use crate::config::MemoryConfig;
use crate::context_composer::{ContextComposer, NO_CAMPAIGN_CONTEXT};
use crate::directives::parse_response;
use crate::error::{EngineError, LlmError};
use crate::ports::{ClockPort, LanguageModel, SessionStore};
use crate::session::{SessionId, SessionRegistry};
use crate::tag_index::{TagIndex, ThrottleCache};
use crate::tracker::{ImportanceTracker, TrackedElement};

/// What a turn produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Reply shown to the player, directive markup removed.
    pub response: String,
    pub saved_items: usize,
    pub npc_updates: usize,
    pub memory_updated: bool,
    pub directives: Vec<Directive>,
    pub session_id: SessionId,
}

pub struct NarrativeEngine {
    config: MemoryConfig,
    registry: SessionRegistry,
    tag_index: TagIndex,
    throttle: ThrottleCache,
    composer: ContextComposer,
    trackers: HashMap<SessionId, ImportanceTracker>,
    llm: Arc<dyn LanguageModel>,
    clock: Arc<dyn ClockPort>,
}

impl NarrativeEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        llm: Arc<dyn LanguageModel>,
        clock: Arc<dyn ClockPort>,
        config: MemoryConfig,
    ) -> Self {
        Self {
            registry: SessionRegistry::new(store, clock.clone(), &config),
            tag_index: TagIndex::new(&config),
            throttle: ThrottleCache::new(config.surface_every),
            composer: ContextComposer::new(config.recent_items),
            trackers: HashMap::new(),
            llm,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SessionRegistry {
        &mut self.registry
    }

    /// Load `user_id`'s sessions and drop all per-session caches.
    pub async fn load_user(&mut self, user_id: &str) -> usize {
        self.tag_index = TagIndex::new(&self.config);
        self.throttle = ThrottleCache::new(self.config.surface_every);
        self.trackers.clear();
        self.registry.load_for_user(user_id).await
    }

    /// Delete a session together with its throttle, cache and tracker state.
    pub async fn delete_session(&mut self, id: &SessionId) -> bool {
        self.throttle.forget_session(id);
        self.tag_index.invalidate(id);
        self.trackers.remove(id);
        self.registry.delete_session(id).await
    }

    /// Campaign digest for `message` in the current session.
    ///
    /// Every call counts as one reference to each tag it finds, so calling
    /// this advances the throttle.
    pub fn compose_context(&mut self, message: &str) -> String {
        let Some(session) = self.registry.current() else {
            return NO_CAMPAIGN_CONTEXT.to_string();
        };
        let now = self.clock.now();
        let id = &session.id;
        let campaign = &session.campaign;

        let tags = self.tag_index.lookup(id, campaign, message, now);
        self.trackers
            .entry(id.clone())
            .or_default()
            .track_mentions(campaign, &tags, now);

        let surfaced: Vec<String> = if campaign.memory_enabled() {
            tags.into_iter()
                .filter(|tag| self.throttle.should_surface(id, tag, now))
                .collect()
        } else {
            Vec::new()
        };
        debug!(session_id = %id, surfaced = surfaced.len(), "Composed context");

        self.composer.compose(campaign, &surfaced).to_prompt_string()
    }

    /// Play one turn of the story.
    pub async fn play_turn(
        &mut self,
        user_message: &str,
        allow_memory_write: bool,
    ) -> Result<TurnOutcome, EngineError> {
        let session_id = self
            .registry
            .current_id()
            .cloned()
            .ok_or(EngineError::NoActiveSession)?;

        let throttle_checkpoint = self.throttle.checkpoint(&session_id);
        let tracker_before = self.trackers.get(&session_id).cloned();

        let context = self.compose_context(user_message);
        let style = self
            .registry
            .current_campaign()
            .map(|c| c.style().to_string())
            .unwrap_or_default();
        let turns = prompt_turns(&context, &style, allow_memory_write, user_message);

        let raw = match self.llm.complete(&turns).await {
            Ok(raw) if !raw.trim().is_empty() => raw,
            failed => {
                let error = failed.err().unwrap_or(LlmError::EmptyCompletion);
                warn!(session_id = %session_id, error = %error, "Language model call failed");
                self.throttle.rollback(throttle_checkpoint);
                match tracker_before {
                    Some(tracker) => {
                        self.trackers.insert(session_id, tracker);
                    }
                    None => {
                        self.trackers.remove(&session_id);
                    }
                }
                return Err(error.into());
            }
        };

        let (response, directives) = if allow_memory_write {
            let parsed = parse_response(&raw);
            (parsed.visible_text, parsed.directives)
        } else {
            (raw.trim().to_string(), Vec::new())
        };

        let campaign = self
            .registry
            .current_campaign_mut()
            .ok_or(EngineError::NoActiveSession)?;
        campaign.push_message(ChatMessage::user(user_message));
        let report = campaign.apply_directives(&directives, self.clock.now());
        campaign.push_message(ChatMessage::assistant(response.clone()));

        self.absorb_touched(&session_id);
        self.registry.save_current().await;

        info!(
            session_id = %session_id,
            saved = report.saved,
            npc_updates = report.emotion_updates,
            "Turn played"
        );

        Ok(TurnOutcome {
            response,
            saved_items: report.saved,
            npc_updates: report.emotion_updates,
            memory_updated: report.changed_anything(),
            directives,
            session_id,
        })
    }

    /// Run an editor change on the current campaign, resurface whatever it
    /// touched, and persist. Returns `None` when no session is active.
    pub async fn edit<R>(&mut self, change: impl FnOnce(&mut Campaign) -> R) -> Option<R> {
        let id = self.registry.current_id()?.clone();
        let result = change(self.registry.current_campaign_mut()?);
        self.absorb_touched(&id);
        self.registry.save_current().await;
        Some(result)
    }

    /// Swap in a whole new campaign for the current session and persist it.
    /// The session's lookups and throttle state are dropped, so every tag
    /// surfaces on its next reference.
    pub async fn replace_campaign(&mut self, campaign: Campaign) -> bool {
        let Some(id) = self.registry.current_id().cloned() else {
            return false;
        };
        self.tag_index.invalidate(&id);
        self.throttle.forget_session(&id);
        if let Some(current) = self.registry.current_campaign_mut() {
            *current = campaign;
            current.take_touched();
        }
        self.registry.save_current().await
    }

    /// The current session's most mentioned entities.
    pub fn recall(&self, limit: usize) -> Vec<&TrackedElement> {
        self.registry
            .current_id()
            .and_then(|id| self.trackers.get(id))
            .map(|tracker| tracker.ranked(limit))
            .unwrap_or_default()
    }

    /// Drop stale lookups and force-surface lore changed since the last call.
    fn absorb_touched(&mut self, id: &SessionId) {
        self.tag_index.invalidate(id);
        let Some(campaign) = self.registry.current_campaign_mut() else {
            return;
        };
        let touched = campaign.take_touched();
        if touched.is_empty() {
            return;
        }

        for key in &touched {
            self.throttle.force_surface(id, key);
        }

        if let Some(campaign) = self.registry.current_campaign() {
            self.trackers
                .entry(id.clone())
                .or_default()
                .track_touched(campaign, &touched, self.clock.now());
        }
        debug!(session_id = %id, touched = touched.len(), "Resurfacing edited lore");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemorySessionStore;
    use crate::ports::ManualClock;
    use async_trait::async_trait;
    use campaign_state::{Location, Npc, NpcField, TagSet};
    use chrono::Utc;
    use std::sync::Mutex;

    /// Returns canned replies and records the prompts it was given.
    struct ScriptedModel {
        replies: Mutex<Vec<Result<String, LlmError>>>,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            let mut replies = replies;
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn system_prompt(&self, call: usize) -> String {
            self.prompts.lock().unwrap()[call][0].content.clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, turns: &[ChatMessage]) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(turns.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("La suite.".to_string()))
        }
    }

    async fn engine_with(model: Arc<ScriptedModel>) -> NarrativeEngine {
        let mut engine = NarrativeEngine::new(
            Arc::new(InMemorySessionStore::new()),
            model,
            Arc::new(ManualClock::new(Utc::now())),
            MemoryConfig::default(),
        );
        engine.load_user("user-1").await;
        engine
    }

    #[tokio::test]
    async fn test_turn_records_both_messages() {
        let model = ScriptedModel::new(vec![Ok("  Le vent se lève.  ".into())]);
        let mut engine = engine_with(model).await;

        let outcome = engine.play_turn("Je regarde autour", false).await.unwrap();

        assert_eq!(outcome.response, "Le vent se lève.");
        assert!(!outcome.memory_updated);
        let messages = engine.registry().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::user("Je regarde autour"));
        assert_eq!(messages[1], ChatMessage::assistant("Le vent se lève."));
    }

    #[tokio::test]
    async fn test_markup_left_alone_without_write_permission() {
        let reply = "Ok [SAVE:LIEU|Forêt|Sombre|bois]";
        let model = ScriptedModel::new(vec![Ok(reply.into())]);
        let mut engine = engine_with(model.clone()).await;

        let outcome = engine.play_turn("Allons-y", false).await.unwrap();

        assert_eq!(outcome.response, reply);
        assert!(engine.registry().current_campaign().unwrap().locations().is_empty());
        assert!(!model.system_prompt(0).contains("SAUVEGARDE:"));
    }

    #[tokio::test]
    async fn test_model_failure_mutates_nothing() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::Unavailable("timeout".into())),
            Ok("   ".into()),
        ]);
        let mut engine = engine_with(model).await;

        assert!(matches!(
            engine.play_turn("Bonjour", true).await,
            Err(EngineError::Llm(LlmError::Unavailable(_)))
        ));
        assert!(matches!(
            engine.play_turn("Bonjour", true).await,
            Err(EngineError::Llm(LlmError::EmptyCompletion))
        ));
        assert!(engine.registry().messages().is_empty());
    }

    #[tokio::test]
    async fn test_edit_resurfaces_changed_lore() {
        let model = ScriptedModel::new(vec![]);
        let mut engine = engine_with(model).await;
        engine
            .edit(|c| {
                c.push_npc(Npc::new("Lyna").with_tags(TagSet::parse_list("archère")));
            })
            .await
            .unwrap();

        assert!(engine.compose_context("Lyna?").contains("PNJ[Lyna]: Lyna"));
        assert!(!engine.compose_context("Lyna !").contains("PNJ[Lyna]"));

        engine
            .edit(|c| c.update_npc(0, NpcField::Description("Blessée".into())))
            .await
            .unwrap();
        assert!(engine.compose_context("Lyna !").contains("PNJ[Lyna]: Lyna"));
    }

    #[tokio::test]
    async fn test_memory_disabled_composes_title_only() {
        let model = ScriptedModel::new(vec![]);
        let mut engine = engine_with(model).await;
        engine
            .edit(|c| {
                c.push_location(Location::new("Forêt Noire"));
                c.set_memory_enabled(false);
            })
            .await;

        assert_eq!(
            engine.compose_context("Forêt Noire"),
            "CAMPAGNE: Aventure sans titre\n\n"
        );
    }

    #[tokio::test]
    async fn test_no_session_context() {
        let mut engine = NarrativeEngine::new(
            Arc::new(InMemorySessionStore::new()),
            ScriptedModel::new(vec![]),
            Arc::new(ManualClock::new(Utc::now())),
            MemoryConfig::default(),
        );
        assert_eq!(engine.compose_context("Bonjour"), NO_CAMPAIGN_CONTEXT);
        assert!(matches!(
            engine.play_turn("Bonjour", true).await,
            Err(EngineError::NoActiveSession)
        ));
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_lore_for_retry() {
        let model = ScriptedModel::new(vec![
            Err(LlmError::Unavailable("timeout".into())),
            Ok("Lyna sourit.".into()),
        ]);
        let mut engine = engine_with(model.clone()).await;
        engine.edit(|c| c.push_npc(Npc::new("Lyna"))).await.unwrap();
        let mentions = engine.recall(1)[0].mentions;

        assert!(engine.play_turn("Je salue Lyna", true).await.is_err());
        assert_eq!(engine.recall(1)[0].mentions, mentions);

        engine.play_turn("Je salue Lyna", true).await.unwrap();
        assert!(model.system_prompt(1).contains("PNJ[Lyna]: Lyna"));
        assert_eq!(engine.recall(1)[0].mentions, mentions + 1);
    }

    #[tokio::test]
    async fn test_global_tag_edit_is_matched_immediately() {
        let model = ScriptedModel::new(vec![]);
        let mut engine = engine_with(model).await;
        engine
            .edit(|c| c.push_npc(Npc::new("Brak").with_tags(TagSet::parse_list("magie"))))
            .await
            .unwrap();
        assert!(!engine.compose_context("la magie").contains("PNJ[magie]"));

        engine
            .edit(|c| c.set_global_tags(TagSet::parse_list("magie")))
            .await
            .unwrap();
        assert!(engine.compose_context("la magie").contains("PNJ[magie]: Brak"));
    }

    #[tokio::test]
    async fn test_replace_campaign_resets_lookups_and_throttle() {
        let model = ScriptedModel::new(vec![]);
        let mut engine = engine_with(model).await;
        engine.edit(|c| c.push_npc(Npc::new("Lyna"))).await.unwrap();
        assert!(engine.compose_context("Lyna").contains("PNJ[Lyna]: Lyna"));
        assert!(!engine.compose_context("la magie").contains("PNJ[magie]"));

        let mut imported = Campaign::new("Importée", Utc::now());
        imported.set_global_tags(TagSet::parse_list("magie"));
        imported.push_npc(Npc::new("Brak").with_tags(TagSet::parse_list("magie")));
        imported.push_npc(Npc::new("Lyna"));
        assert!(engine.replace_campaign(imported).await);

        assert!(engine.compose_context("la magie").contains("PNJ[magie]: Brak"));
        assert!(engine.compose_context("Lyna").contains("PNJ[Lyna]: Lyna"));
        assert!(engine
            .registry_mut()
            .current_campaign_mut()
            .unwrap()
            .take_touched()
            .is_empty());
    }
}
