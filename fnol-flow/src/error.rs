use thiserror::Error;

pub type Result<T> = std::result::Result<T, FnolError>;

/// Errors raised by the intake flow.
#[derive(Error, Debug)]
pub enum FnolError {
    /// Submission was attempted without a session key.
    #[error("missing session key")]
    MissingSessionKey,

    /// No session exists under the given key.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The session crossed its expiry threshold before submission.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// The session timing configuration is unusable.
    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
