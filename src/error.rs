//! Error taxonomy for logic preparation and content fetches.

use std::string::FromUtf8Error;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::CacheKey;

/// Errors raised while preparing a Logic or fetching content for a Trial
#[derive(Debug, Error)]
pub enum LogicError {
    #[error("unknown logic implementation: {0:?}")]
    UnknownImplementation(String),

    #[error("logic not found: {0}")]
    LogicNotFound(i64),

    #[error("trial not found: {0}")]
    TrialNotFound(Uuid),

    #[error("media not found: {0}")]
    MediaNotFound(i64),

    #[error("text cache entry not found: {0}")]
    CacheNotFound(CacheKey),

    #[error("text index {index} out of range for {key}")]
    TextIndexOutOfRange { key: CacheKey, index: usize },

    #[error("invalid media list entry: {0:?}")]
    InvalidSelection(String),

    #[error("invalid media order: {0:?}")]
    InvalidMediaOrder(String),

    #[error("content of media {media_id} is not valid UTF-8")]
    Decode {
        media_id: i64,
        #[source]
        source: FromUtf8Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl LogicError {
    /// Whether this error belongs to the "resource not found" class
    /// surfaced to callers (unknown implementation, stale references,
    /// missing cache entries).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LogicError::UnknownImplementation(_)
                | LogicError::LogicNotFound(_)
                | LogicError::TrialNotFound(_)
                | LogicError::MediaNotFound(_)
                | LogicError::CacheNotFound(_)
                | LogicError::TextIndexOutOfRange { .. }
        )
    }
}
