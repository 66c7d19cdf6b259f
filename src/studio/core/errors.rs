//! Error types for the studio core.

use thiserror::Error;

use crate::studio::core::ids::ConversationId;

/// Studio error type.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No conversation with this id.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),
    /// A send for this conversation is still waiting on the template service.
    #[error("a message is already being sent for conversation {0}")]
    SendInProgress(ConversationId),
    /// `SQLite` storage error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Async `SQLite` connection error.
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
    /// HTTP client construction error.
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;
