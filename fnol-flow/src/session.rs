use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::Result, model::FormSnapshot};

/// Lifecycle state of a stored session. Inactive is represented by the
/// session's absence from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Active,
    ReminderDue,
    Expired,
}

/// A timed intake session. The key is opaque and must be presented to
/// submit the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub remind_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: SessionState,
    pub data: Option<FormSnapshot>,
}

impl Session {
    pub fn new(key: String, remind_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            key,
            created_at: Utc::now(),
            remind_at,
            expires_at,
            state: SessionState::Active,
            data: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.state == SessionState::Expired || Utc::now() >= self.expires_at
    }
}

/// Trait for storing and retrieving sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: Session) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<Session>>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, Session>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: Session) -> Result<()> {
        self.sessions.insert(session.key.clone(), session);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Session>> {
        Ok(self.sessions.get(key).map(|entry| entry.clone()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.sessions.remove(key);
        Ok(())
    }
}
