//! Reddit API client and subreddit feed source.
//!
//! Uses the OAuth2 client-credentials ("application only") flow. The access
//! token is cached and refreshed shortly before it expires, or after the API
//! rejects it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{FeedItem, FeedSource, SourceError};
use crate::config::RedditConfig;

/// Refresh the token this long before Reddit says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound Reddit accepts for the listing `limit` parameter.
const MAX_LISTING_LIMIT: usize = 100;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

/// Listing response (`/r/{name}/new`).
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    created_utc: f64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

/// Authenticated Reddit API client shared by every subreddit source.
pub struct RedditClient {
    client: Client,
    client_id: String,
    client_secret: String,
    auth_base: String,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    /// Create a new client from configuration. No request is made.
    pub fn new(config: &RedditConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_base: config.auth_base.trim_end_matches('/').to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        })
    }

    /// Obtain an access token now, failing if the credentials are rejected.
    pub async fn authenticate(&self) -> Result<(), SourceError> {
        let token = self.request_token().await?;
        *self.token.lock().await = Some(token);
        info!("Authenticated with Reddit API");
        Ok(())
    }

    /// Get a valid access token, requesting a new one when needed.
    async fn access_token(&self) -> Result<String, SourceError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken, SourceError> {
        debug!("Requesting Reddit access token");
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Auth(format!("token request rejected ({status})")));
        }
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(SourceError::Auth(error));
        }
        let value = body
            .access_token
            .ok_or_else(|| SourceError::Auth("no access token in response".to_string()))?;
        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));

        Ok(AccessToken {
            value,
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        })
    }

    /// Fetch the newest posts of a subreddit.
    pub async fn new_posts(
        &self,
        subreddit: &str,
        limit: usize,
    ) -> Result<Vec<FeedItem>, SourceError> {
        let token = self.access_token().await?;
        let limit = limit.clamp(1, MAX_LISTING_LIMIT);

        let response = self
            .client
            .get(format!("{}/r/{}/new", self.api_base, subreddit))
            .query(&[("limit", limit.to_string()), ("raw_json", "1".to_string())])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Drop the cached token so the next call re-authenticates.
            *self.token.lock().await = None;
            return Err(SourceError::Auth("access token rejected".to_string()));
        }
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        let bytes = response.bytes().await?;
        parse_listing(&bytes)
    }

    /// Revoke the cached access token. Errors are logged, not returned.
    pub async fn close(&self) {
        let Some(token) = self.token.lock().await.take() else {
            return;
        };

        let result = self
            .client
            .post(format!("{}/api/v1/revoke_token", self.auth_base))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("token", token.value.as_str()),
                ("token_type_hint", "access_token"),
            ])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Reddit access token revoked");
            }
            Ok(response) => warn!("Failed to revoke Reddit token: HTTP {}", response.status()),
            Err(e) => warn!("Failed to revoke Reddit token: {}", e),
        }
    }
}

/// Parse a listing body into feed items, preserving listing order.
fn parse_listing(bytes: &[u8]) -> Result<Vec<FeedItem>, SourceError> {
    let listing: Listing =
        serde_json::from_slice(bytes).map_err(|e| SourceError::Parse(e.to_string()))?;

    let items = listing
        .data
        .children
        .into_iter()
        .filter_map(|child| {
            let post = child.data;
            let created_at = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0)?;
            let url = post
                .url
                .filter(|u| !u.is_empty())
                .or_else(|| post.permalink.map(|p| format!("https://www.reddit.com{p}")))
                .unwrap_or_default();

            Some(FeedItem {
                id: post.id,
                title: post.title,
                url,
                created_at,
            })
        })
        .collect();

    Ok(items)
}

/// A subreddit's `new` listing as a feed source.
pub struct RedditSource {
    client: Arc<RedditClient>,
    subreddit: String,
    name: String,
}

impl RedditSource {
    /// Create a source for `subreddit` (with or without the `r/` prefix).
    pub fn new(client: Arc<RedditClient>, subreddit: &str) -> Self {
        let subreddit = subreddit.trim().trim_start_matches("r/").to_string();
        let name = format!("r/{subreddit}");
        Self {
            client,
            subreddit,
            name,
        }
    }
}

#[async_trait]
impl FeedSource for RedditSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<FeedItem>, SourceError> {
        self.client.new_posts(&self.subreddit, limit).await
    }
}
