//! Error types for giveaway-scout.

use thiserror::Error;

/// Common error type for giveaway-scout.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for configuration values or user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Discord API error.
    #[error("Discord error: {0}")]
    Discord(#[from] crate::discord::DiscordError),

    /// Feed source error.
    #[error("source error: {0}")]
    Source(#[from] crate::source::SourceError),

    /// Web server error.
    #[error("web server error: {0}")]
    Web(String),
}

impl From<sqlx::Error> for ScoutError {
    fn from(e: sqlx::Error) -> Self {
        ScoutError::Database(e.to_string())
    }
}

/// Result type alias for giveaway-scout operations.
pub type Result<T> = std::result::Result<T, ScoutError>;
