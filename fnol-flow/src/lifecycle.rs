//! Session state machine: `Active -> ReminderDue -> Expired`, driven by
//! wall-clock timers. Threshold crossings are broadcast to subscribers and
//! fire exactly once; a replaced or ended session never emits stale events.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{FnolError, Result};
use crate::model::FormSnapshot;
use crate::session::{InMemorySessionStorage, Session, SessionState, SessionStorage};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Lifecycle notifications delivered to subscribers, typically surfaced to
/// the user as dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ReminderDue { key: String },
    Expired { key: String },
}

/// Session timing. The reminder fires `reminder_lead` before expiry.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub reminder_lead: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            reminder_lead: Duration::from_secs(5 * 60),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(FnolError::InvalidConfig("ttl must be non-zero".to_string()));
        }
        if self.reminder_lead >= self.ttl {
            return Err(FnolError::InvalidConfig(
                "reminder_lead must be shorter than ttl".to_string(),
            ));
        }
        Ok(())
    }
}

struct ActiveSession {
    key: String,
    timer: JoinHandle<()>,
}

/// Owns the single active session, its timers and the event channel.
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
    events: broadcast::Sender<SessionEvent>,
    active: Arc<Mutex<Option<ActiveSession>>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Result<Self> {
        Self::with_storage(Arc::new(InMemorySessionStorage::new()), config)
    }

    pub fn with_storage(storage: Arc<dyn SessionStorage>, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            storage,
            config,
            events,
            active: Arc::new(Mutex::new(None)),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Start a new session and return its key. At most one session is
    /// active at a time: any previous session is ended first.
    pub async fn start(&self) -> Result<String> {
        let previous = self.active.lock().unwrap().take();
        if let Some(prev) = previous {
            prev.timer.abort();
            self.storage.delete(&prev.key).await?;
            debug!(session = %prev.key, "previous session replaced");
        }

        let key = Uuid::new_v4().to_string();
        let ttl = chrono::Duration::from_std(self.config.ttl)
            .map_err(|e| FnolError::InvalidConfig(e.to_string()))?;
        let lead = chrono::Duration::from_std(self.config.reminder_lead)
            .map_err(|e| FnolError::InvalidConfig(e.to_string()))?;
        let now = Utc::now();
        let session = Session::new(key.clone(), now + (ttl - lead), now + ttl);
        self.storage.save(session).await?;

        let remind_in = self.config.ttl - self.config.reminder_lead;
        let timer = tokio::spawn(session_timer(
            self.storage.clone(),
            self.events.clone(),
            self.active.clone(),
            key.clone(),
            remind_in,
            self.config.reminder_lead,
        ));
        *self.active.lock().unwrap() = Some(ActiveSession {
            key: key.clone(),
            timer,
        });

        info!(session = %key, ttl_secs = self.config.ttl.as_secs(), "session started");
        Ok(key)
    }

    /// End a session: cancel its timers and drop it from the store.
    /// Invoked on navigation away or after submission.
    pub async fn end(&self, key: &str) -> Result<()> {
        {
            let mut slot = self.active.lock().unwrap();
            if slot.as_ref().is_some_and(|a| a.key == key) {
                if let Some(active) = slot.take() {
                    active.timer.abort();
                }
            }
        }
        self.storage.delete(key).await?;
        debug!(session = %key, "session ended");
        Ok(())
    }

    pub async fn session(&self, key: &str) -> Result<Session> {
        self.storage
            .get(key)
            .await?
            .ok_or_else(|| FnolError::SessionNotFound(key.to_string()))
    }

    /// Record the form snapshot on the session. Rejected once the session
    /// has expired.
    pub async fn attach_data(&self, key: &str, data: FormSnapshot) -> Result<()> {
        let mut session = self.session(key).await?;
        if session.is_expired() {
            return Err(FnolError::SessionExpired(key.to_string()));
        }
        session.data = Some(data);
        self.storage.save(session).await
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.lock().unwrap().as_ref().is_some_and(|a| a.key == key)
    }
}

/// One timer task per session. Crosses the reminder threshold, then the
/// expiry threshold, emitting each event at most once. The task re-checks
/// that its session is still the active one before firing so an aborted or
/// replaced session stays silent.
async fn session_timer(
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<SessionEvent>,
    active: Arc<Mutex<Option<ActiveSession>>>,
    key: String,
    remind_in: Duration,
    lead: Duration,
) {
    tokio::time::sleep(remind_in).await;
    if !still_active(&active, &key) {
        return;
    }
    if let Ok(Some(mut session)) = storage.get(&key).await {
        if session.state == SessionState::Active {
            session.state = SessionState::ReminderDue;
            let _ = storage.save(session).await;
            debug!(session = %key, "reminder due");
            let _ = events.send(SessionEvent::ReminderDue { key: key.clone() });
        }
    }

    tokio::time::sleep(lead).await;
    if !still_active(&active, &key) {
        return;
    }
    if let Ok(Some(mut session)) = storage.get(&key).await {
        if session.state != SessionState::Expired {
            session.state = SessionState::Expired;
            let _ = storage.save(session).await;
            info!(session = %key, "session expired");
            let _ = events.send(SessionEvent::Expired { key: key.clone() });
        }
    }

    // Expired sessions no longer occupy the active slot. The record stays
    // in the store so lookups can tell "expired" from "never existed".
    let mut slot = active.lock().unwrap();
    if slot.as_ref().is_some_and(|a| a.key == key) {
        slot.take();
    }
}

fn still_active(active: &Arc<Mutex<Option<ActiveSession>>>, key: &str) -> bool {
    active.lock().unwrap().as_ref().is_some_and(|a| a.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    fn fast_config() -> SessionConfig {
        SessionConfig {
            ttl: Duration::from_millis(300),
            reminder_lead: Duration::from_millis(150),
        }
    }

    #[test]
    fn config_rejects_lead_longer_than_ttl() {
        let config = SessionConfig {
            ttl: Duration::from_secs(60),
            reminder_lead: Duration::from_secs(60),
        };
        assert!(config.validate().is_err());
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn reminder_and_expiry_fire_exactly_once() {
        let manager = SessionManager::new(fast_config()).unwrap();
        let mut events = manager.subscribe();

        let key = manager.start().await.unwrap();

        let first = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("reminder should fire")
            .unwrap();
        assert_eq!(first, SessionEvent::ReminderDue { key: key.clone() });

        let second = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("expiry should fire")
            .unwrap();
        assert_eq!(second, SessionEvent::Expired { key: key.clone() });

        // No further events after both thresholds have been crossed.
        assert!(timeout(Duration::from_millis(500), events.recv())
            .await
            .is_err());

        let session = manager.session(&key).await.unwrap();
        assert_eq!(session.state, SessionState::Expired);
        assert!(!manager.is_active(&key));
    }

    #[tokio::test]
    async fn replaced_session_stays_silent() {
        let manager = SessionManager::new(fast_config()).unwrap();
        let mut events = manager.subscribe();

        let old_key = manager.start().await.unwrap();
        let new_key = manager.start().await.unwrap();
        assert!(!manager.is_active(&old_key));
        assert!(manager.is_active(&new_key));

        // The replaced session is gone from the store.
        assert!(matches!(
            manager.session(&old_key).await,
            Err(FnolError::SessionNotFound(_))
        ));

        // Every event delivered from here on belongs to the new session.
        while let Ok(result) = timeout(Duration::from_secs(2), events.recv()).await {
            match result.unwrap() {
                SessionEvent::ReminderDue { key } | SessionEvent::Expired { key } => {
                    assert_eq!(key, new_key);
                }
            }
        }
    }

    #[tokio::test]
    async fn ended_session_emits_nothing() {
        let manager = SessionManager::new(fast_config()).unwrap();
        let mut events = manager.subscribe();

        let key = manager.start().await.unwrap();
        manager.end(&key).await.unwrap();

        assert!(timeout(Duration::from_millis(600), events.recv())
            .await
            .is_err());
        assert!(matches!(
            manager.session(&key).await,
            Err(FnolError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn attach_data_rejected_after_expiry() {
        let manager = SessionManager::new(SessionConfig {
            ttl: Duration::from_millis(100),
            reminder_lead: Duration::from_millis(50),
        })
        .unwrap();
        let key = manager.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        let result = manager.attach_data(&key, FormSnapshot::default()).await;
        assert!(matches!(result, Err(FnolError::SessionExpired(_))));
    }
}
