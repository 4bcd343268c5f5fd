// Error types for calls against the commerce platform

use thiserror::Error;

use crate::session::SessionError;

/// Error taxonomy for a single platform round trip
///
/// The client never retries internally; callers decide per policy.
/// Only `RateLimited` is retryable.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Credentials missing or rejected by the platform
    #[error("platform rejected the shop credentials")]
    Unauthorized,

    /// Platform throttled the call; retry with backoff
    #[error("platform rate limit hit")]
    RateLimited,

    /// Addressed resource does not exist remotely
    #[error("platform resource not found")]
    NotFound,

    /// Any other non-success response
    #[error("platform returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Connection-level failure before a status was received
    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PlatformError {
    /// Whether the caller's backoff policy should retry this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlatformError::RateLimited)
    }
}

impl From<SessionError> for PlatformError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Unauthenticated(_) => PlatformError::Unauthorized,
            SessionError::Transport(e) => PlatformError::Transport(e),
            SessionError::Remote { status } => PlatformError::Remote {
                status,
                body: "session store failure".to_string(),
            },
        }
    }
}
