//! Sessions - one campaign per play session, owned by one user.

mod registry;

pub use registry::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campaign_state::Campaign;

/// Session identifier, `session_<uuid>` for sessions created here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new random session id.
    pub fn generate() -> Self {
        Self(format!("session_{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A play session and its campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub campaign: Campaign,
}

impl Session {
    /// Create a session with an empty campaign titled after the session.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            id: SessionId::generate(),
            user_id: user_id.into(),
            campaign: Campaign::new(name.clone(), now),
            name,
            created_at: now,
            last_accessed: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_prefixed_and_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert!(a.as_str().starts_with("session_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_session_titles_campaign() {
        let session = Session::new("user-1", "Aventure Principale", Utc::now());
        assert_eq!(session.campaign.title(), "Aventure Principale");
        assert_eq!(session.created_at, session.last_accessed);
    }

    #[test]
    fn test_serialized_field_names() {
        let session = Session::new("user-1", "A", Utc::now());
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("lastAccessed").is_some());
        assert!(json.get("userId").is_some());
        assert!(json["campaign"]["meta"].get("titre").is_some());
    }
}
