//! Port traits for the engine's outside collaborators.
//!
//! The engine never branches on where it runs: persistence, the language
//! model and the clock are all injected through these traits.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

use campaign_state::ChatMessage;

use crate::error::{LlmError, StoreError};
use crate::session::{Session, SessionId};

// =============================================================================
// Session Storage
// =============================================================================

/// Key-value store of sessions, keyed by session id.
///
/// Only single-session upserts are assumed atomic, except for
/// `commit_switch`, which adapters should implement as one write when they can.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>, StoreError>;
    async fn upsert(&self, session: &Session) -> Result<(), StoreError>;
    async fn delete(&self, id: &SessionId) -> Result<(), StoreError>;

    /// Persist the session being left and the session being entered together.
    async fn commit_switch(&self, outgoing: &Session, incoming: &Session) -> Result<(), StoreError> {
        self.upsert(outgoing).await?;
        self.upsert(incoming).await
    }
}

// =============================================================================
// Language Model
// =============================================================================

/// Text completion over a list of prompt turns.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, turns: &[ChatMessage]) -> Result<String, LlmError>;
}

// =============================================================================
// Clock
// =============================================================================

pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System clock - uses real time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to drive cache windows in tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(Duration::seconds(31));
        assert_eq!(clock.now() - start, Duration::seconds(31));
    }
}
