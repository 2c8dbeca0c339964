//! Session registry - the sessions held by this process and which one is current.
//!
//! The registry is an explicit value handed to request handlers; there is no
//! process-wide instance. Persistence failures are logged and never surface to
//! callers: in-memory state stays authoritative, and the next save retries
//! implicitly.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use campaign_state::{Campaign, ChatMessage};

use super::{Session, SessionId};
use crate::config::MemoryConfig;
use crate::ports::{ClockPort, SessionStore};

pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn ClockPort>,
    default_name: String,
    initial_name: String,
    user_id: Option<String>,
    sessions: HashMap<SessionId, Session>,
    current: Option<SessionId>,
}

impl SessionRegistry {
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn ClockPort>,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            store,
            clock,
            default_name: config.default_session_name.clone(),
            initial_name: config.initial_session_name.clone(),
            user_id: None,
            sessions: HashMap::new(),
            current: None,
        }
    }

    /// Load every session of `user_id`, replacing whatever was held.
    ///
    /// The most recently accessed session becomes current. A user without
    /// sessions gets a fresh one. Returns the number of sessions loaded.
    pub async fn load_for_user(&mut self, user_id: &str) -> usize {
        self.user_id = Some(user_id.to_string());
        self.sessions.clear();
        self.current = None;

        let loaded = match self.store.list_by_user(user_id).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load sessions");
                Vec::new()
            }
        };
        let count = loaded.len();

        self.current = loaded
            .iter()
            .max_by_key(|s| s.last_accessed)
            .map(|s| s.id.clone());
        self.sessions = loaded.into_iter().map(|s| (s.id.clone(), s)).collect();

        if self.sessions.is_empty() {
            let name = self.initial_name.clone();
            self.create_session(Some(name.as_str())).await;
        }

        info!(user_id = %user_id, sessions = count, "Loaded sessions");
        count
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Create a session with an empty campaign and make it current.
    pub async fn create_session(&mut self, name: Option<&str>) -> SessionId {
        let name = name.unwrap_or(self.default_name.as_str()).to_string();
        let owner = self.user_id.clone().unwrap_or_default();
        let session = Session::new(owner, name, self.clock.now());
        let id = session.id.clone();

        self.sessions.insert(id.clone(), session);
        self.current = Some(id.clone());
        self.persist(&id).await;

        info!(session_id = %id, "Created session");
        id
    }

    /// Make `id` the current session. Unknown ids are ignored.
    ///
    /// The outgoing and incoming sessions are committed to the store in one
    /// call before `current` moves, so the outgoing session's last turn cannot
    /// be lost between the two steps.
    pub async fn switch_session(&mut self, id: &SessionId) -> bool {
        if !self.sessions.contains_key(id) {
            debug!(session_id = %id, "Switch to unknown session ignored");
            return false;
        }

        let now = self.clock.now();
        if let Some(incoming) = self.sessions.get_mut(id) {
            incoming.last_accessed = now;
        }

        match self.current.clone().filter(|cur| cur != id) {
            Some(outgoing_id) => {
                if let Some(outgoing) = self.sessions.get_mut(&outgoing_id) {
                    outgoing.campaign.mark_saved(now);
                }
                if let (Some(outgoing), Some(incoming)) =
                    (self.sessions.get(&outgoing_id), self.sessions.get(id))
                {
                    if let Err(e) = self.store.commit_switch(outgoing, incoming).await {
                        warn!(
                            from = %outgoing_id,
                            to = %id,
                            error = %e,
                            "Failed to persist session switch"
                        );
                    }
                }
            }
            None => {
                self.persist(id).await;
            }
        }

        self.current = Some(id.clone());
        true
    }

    /// Forget a session here and in the store.
    pub async fn delete_session(&mut self, id: &SessionId) -> bool {
        if self.sessions.remove(id).is_none() {
            return false;
        }
        if let Err(e) = self.store.delete(id).await {
            warn!(session_id = %id, error = %e, "Failed to delete session from store");
        }
        if self.current.as_ref() == Some(id) {
            self.current = self
                .sessions
                .values()
                .max_by_key(|s| s.last_accessed)
                .map(|s| s.id.clone());
        }
        true
    }

    pub async fn rename_session(&mut self, id: &SessionId, name: &str) -> bool {
        let Some(session) = self.sessions.get_mut(id) else {
            return false;
        };
        session.name = name.to_string();
        self.persist(id).await;
        true
    }

    /// All sessions, most recently accessed first.
    pub fn sessions(&self) -> Vec<&Session> {
        let mut list: Vec<_> = self.sessions.values().collect();
        list.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        list
    }

    pub fn session(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn current_id(&self) -> Option<&SessionId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref().and_then(|id| self.sessions.get(id))
    }

    pub fn current_campaign(&self) -> Option<&Campaign> {
        self.current().map(|s| &s.campaign)
    }

    pub fn current_campaign_mut(&mut self) -> Option<&mut Campaign> {
        let id = self.current.as_ref()?;
        self.sessions.get_mut(id).map(|s| &mut s.campaign)
    }

    /// Replace the whole campaign of the current session and persist it.
    pub async fn replace_campaign(&mut self, campaign: Campaign) -> bool {
        let Some(current) = self.current_campaign_mut() else {
            return false;
        };
        *current = campaign;
        self.save_current().await
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.current_campaign()
            .map(Campaign::messages)
            .unwrap_or_default()
    }

    pub fn set_messages(&mut self, messages: Vec<ChatMessage>) -> bool {
        match self.current_campaign_mut() {
            Some(campaign) => {
                campaign.set_messages(messages);
                true
            }
            None => false,
        }
    }

    pub fn push_message(&mut self, message: ChatMessage) -> bool {
        match self.current_campaign_mut() {
            Some(campaign) => {
                campaign.push_message(message);
                true
            }
            None => false,
        }
    }

    /// Persist the current session. Returns whether the store accepted it.
    pub async fn save_current(&mut self) -> bool {
        match self.current.clone() {
            Some(id) => self.persist(&id).await,
            None => false,
        }
    }

    async fn persist(&mut self, id: &SessionId) -> bool {
        let now = self.clock.now();
        let Some(session) = self.sessions.get_mut(id) else {
            return false;
        };
        session.campaign.mark_saved(now);

        match self.store.upsert(session).await {
            Ok(()) => {
                debug!(session_id = %id, "Session persisted");
                true
            }
            Err(e) => {
                warn!(session_id = %id, error = %e, "Failed to persist session");
                false
            }
        }
    }
}
