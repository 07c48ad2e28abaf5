/// Failure of a remote fetch or of the feed runtime itself.
///
/// Carried inside [`crate::fetcher::PagingState::Error`], so it is `Clone`
/// and holds rendered messages rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Feed runtime is no longer running")]
    Closed,
}

impl FeedError {
    pub fn transport(message: impl Into<String>) -> Self {
        FeedError::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        FeedError::Decode {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::decode(e.to_string())
    }
}

/// Failure of the on-device cache. Never surfaced to the UI: the cache logs
/// it and behaves as a miss.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
