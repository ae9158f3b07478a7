//! Error types for provider calls and session storage

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Authorization code could not be exchanged (non-2xx or malformed reply)
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// Provider rejected the refresh token; the session must be discarded
    #[error("session refresh rejected: {0}")]
    Refresh(String),

    /// Verify endpoint answered with an unexpected status or body
    #[error("token verification failed: {0}")]
    Verify(String),

    #[error("userinfo request failed: {0}")]
    UserInfo(String),

    /// Network-level failure talking to the provider
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),

    /// No stored session to act on
    #[error("no active session")]
    NoSession,

    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True when the provider could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
