//! Session store persisted as a single JSON document on disk.
//!
//! The whole document is rewritten on every change: it is written to a
//! sibling temp file and renamed over the target, so a crash leaves either
//! the old or the new document, never a torn one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::ports::SessionStore;
use crate::session::{Session, SessionId};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionsDocument {
    #[serde(default)]
    sessions: BTreeMap<SessionId, Session>,
}

pub struct JsonFileSessionStore {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SessionsDocument, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionsDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, doc: &SessionsDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), sessions = doc.sessions.len(), "Wrote sessions file");
        Ok(())
    }

    async fn modify<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut SessionsDocument) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.read().await?;
        f(&mut doc);
        self.write(&doc).await
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read().await?.sessions.remove(id))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut sessions: Vec<_> = self
            .read()
            .await?
            .sessions
            .into_values()
            .filter(|s| s.user_id == user_id)
            .collect();
        sessions.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        Ok(sessions)
    }

    async fn upsert(&self, session: &Session) -> Result<(), StoreError> {
        let session = session.clone();
        self.modify(move |doc| {
            doc.sessions.insert(session.id.clone(), session);
        })
        .await
    }

    async fn delete(&self, id: &SessionId) -> Result<(), StoreError> {
        let id = id.clone();
        self.modify(move |doc| {
            doc.sessions.remove(&id);
        })
        .await
    }

    async fn commit_switch(&self, outgoing: &Session, incoming: &Session) -> Result<(), StoreError> {
        let (outgoing, incoming) = (outgoing.clone(), incoming.clone());
        self.modify(move |doc| {
            doc.sessions.insert(outgoing.id.clone(), outgoing);
            doc.sessions.insert(incoming.id.clone(), incoming);
        })
        .await
    }
}
