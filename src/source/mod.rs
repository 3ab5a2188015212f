//! Feed sources for giveaway-scout.
//!
//! A feed source yields its most recent items, newest first. Two kinds are
//! provided: Reddit subreddits (OAuth API) and generic RSS/Atom feeds.

pub mod feed;
pub mod reddit;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use feed::{validate_url, WebFeedSource};
pub use reddit::{RedditClient, RedditSource};

/// Feed source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The fetch did not complete within the per-source timeout.
    #[error("fetch timed out")]
    Timeout,

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The upstream API returned an unexpected status.
    #[error("HTTP error: {0}")]
    Status(reqwest::StatusCode),

    /// The response body could not be parsed.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The source is misconfigured (bad URL, forbidden host, ...).
    #[error("invalid source: {0}")]
    Invalid(String),
}

/// An item fetched from a feed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Identifier, unique within its source.
    pub id: String,
    /// Item title.
    pub title: String,
    /// Link to the item (or the link it points at).
    pub url: String,
    /// When the item was posted.
    pub created_at: DateTime<Utc>,
}

impl FeedItem {
    /// Create a new feed item.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            created_at,
        }
    }
}

/// Read-only access to a named source's most recent items.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Name used in logs and settings (e.g., `r/pcgaming`).
    fn name(&self) -> &str;

    /// Fetch at most `limit` of the most recent items.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<FeedItem>, SourceError>;
}
