//! High-level intake flow: start a session (landing page), submit the form
//! (form page), and hand back the confirmation payload.

use tokio::sync::broadcast;
use tracing::info;

use crate::error::{FnolError, Result};
use crate::lifecycle::{SessionConfig, SessionEvent, SessionManager};
use crate::mailto::{self, EmailLink, OversizeHandler};
use crate::model::FormSnapshot;
use crate::report;

/// Payload the confirmation page renders after a successful submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub fnol_id: String,
    pub email_link: EmailLink,
}

pub struct FnolPortal {
    manager: SessionManager,
    mailbox: String,
}

impl FnolPortal {
    pub fn new(mailbox: impl Into<String>, config: SessionConfig) -> Result<Self> {
        Ok(Self {
            manager: SessionManager::new(config)?,
            mailbox: mailbox.into(),
        })
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.manager.subscribe()
    }

    /// Landing-page action: open a session and hand the key to the form.
    pub async fn start(&self) -> Result<String> {
        self.manager.start().await
    }

    /// Form-page action: record the snapshot, serialize the email body,
    /// negotiate the link size, and close the session. A missing key aborts
    /// the submission; so does an expired session.
    pub async fn submit(
        &self,
        key: &str,
        snapshot: FormSnapshot,
        handler: &dyn OversizeHandler,
    ) -> Result<Submission> {
        if key.is_empty() {
            return Err(FnolError::MissingSessionKey);
        }

        let session = self.manager.session(key).await?;
        if session.is_expired() {
            return Err(FnolError::SessionExpired(key.to_string()));
        }

        self.manager.attach_data(key, snapshot.clone()).await?;

        let body = report::build_email_body(key, &snapshot);
        let email_link = mailto::construct_email_link(&self.mailbox, key, &body, handler).await;

        info!(
            fnol_id = %key,
            truncated = email_link.truncated,
            body_len = body.len(),
            "claim submitted"
        );

        // Submission consumes the session.
        self.manager.end(key).await?;

        Ok(Submission {
            fnol_id: key.to_string(),
            email_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailto::SilentOversizeHandler;
    use crate::model::{Policy, Reporter};

    fn portal() -> FnolPortal {
        FnolPortal::new("claims@example.com", SessionConfig::default()).unwrap()
    }

    fn snapshot() -> FormSnapshot {
        FormSnapshot {
            reporter: Reporter {
                relation_to_insured: "Insured".to_string(),
                ..Reporter::default()
            },
            policy: Policy {
                policy_number: "POL-77".to_string(),
                contact_same_as_reporter: true,
                ..Policy::default()
            },
            ..FormSnapshot::default()
        }
    }

    #[tokio::test]
    async fn missing_key_aborts_submission() {
        let portal = portal();
        let result = portal
            .submit("", snapshot(), &SilentOversizeHandler)
            .await;
        assert!(matches!(result, Err(FnolError::MissingSessionKey)));
    }

    #[tokio::test]
    async fn unknown_key_aborts_submission() {
        let portal = portal();
        let result = portal
            .submit("not-a-session", snapshot(), &SilentOversizeHandler)
            .await;
        assert!(matches!(result, Err(FnolError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn submission_consumes_the_session() {
        let portal = portal();
        let key = portal.start().await.unwrap();

        let submission = portal
            .submit(&key, snapshot(), &SilentOversizeHandler)
            .await
            .unwrap();
        assert_eq!(submission.fnol_id, key);
        assert!(submission.email_link.url.starts_with("mailto:claims@example.com?"));
        assert!(submission.email_link.body.contains("Policy Number: POL-77"));

        // The key is single-use.
        let again = portal
            .submit(&key, snapshot(), &SilentOversizeHandler)
            .await;
        assert!(matches!(again, Err(FnolError::SessionNotFound(_))));
    }
}
