//! In-process session store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::ports::SessionStore;
use crate::session::{Session, SessionId};

/// Session store backed by a map. Contents are lost with the process.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let mut sessions: Vec<_> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        Ok(sessions)
    }

    async fn upsert(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn commit_switch(&self, outgoing: &Session, incoming: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(outgoing.id.clone(), outgoing.clone());
        sessions.insert(incoming.id.clone(), incoming.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_upsert_get_delete() {
        let store = InMemorySessionStore::new();
        let session = Session::new("user-1", "A", Utc::now());

        store.upsert(&session).await.unwrap();
        assert_eq!(store.get(&session.id).await.unwrap(), Some(session.clone()));

        store.delete(&session.id).await.unwrap();
        assert!(store.get(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_user_filters_owner() {
        let store = InMemorySessionStore::new();
        store.upsert(&Session::new("user-1", "A", Utc::now())).await.unwrap();
        store.upsert(&Session::new("user-2", "B", Utc::now())).await.unwrap();

        let listed = store.list_by_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "A");
        assert_eq!(store.len().await, 2);
    }
}
