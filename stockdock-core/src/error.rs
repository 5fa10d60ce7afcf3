use thiserror::Error;

/// Faults raised by a [`FeedTransport`](crate::feed::FeedTransport) while talking to the broker.
///
/// These never escape the [`FeedSession`](crate::feed::FeedSession): they are logged and turned
/// into a reconnect.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum TransportError {
    #[error("failed to connect to broker {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("failed to subscribe to topic {topic}: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("failed to unsubscribe from topic {topic}: {reason}")]
    Unsubscribe { topic: String, reason: String },

    #[error("failed to disconnect cleanly: {0}")]
    Disconnect(String),

    #[error("broker connection closed: {0}")]
    Closed(String),

    #[error("transport request issued without an active connection")]
    NotConnected,
}

impl TransportError {
    /// Determine if the error means the broker link is gone and a reconnect is required.
    ///
    /// A failed `disconnect` is the only fault that leaves nothing to recover.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_disconnect(&self) -> bool {
        match self {
            TransportError::Disconnect(_) => false,
            _ => true,
        }
    }
}

/// Reasons a feed message is rejected as a whole.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum PayloadError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(String),

    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("expected a top-level JSON array, found {found}")]
    NotArray { found: &'static str },
}

/// Invalid static configuration or environment overrides.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("unknown scroll physics preset: {0}")]
    UnknownPreset(String),

    #[error("unknown navigation mode: {0}")]
    UnknownMode(String),

    #[error("screen layout page {page} has {len} cards, expected {expected}")]
    PageSize {
        page: usize,
        len: usize,
        expected: usize,
    },

    #[error("screen layout has no pages")]
    EmptyLayout,

    #[error("feed key {key} maps to {display_name}, which is not on any page")]
    UnknownDisplayName { key: String, display_name: String },
}
