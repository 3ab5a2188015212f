//! RSS/Atom feed source with SSRF protection and size limits.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use super::{FeedItem, FeedSource, SourceError};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// RSS/Atom feed fetched over HTTP.
pub struct WebFeedSource {
    url: String,
    client: Client,
    max_size: u64,
}

impl WebFeedSource {
    /// Create a feed source for `url`.
    ///
    /// The URL is validated up front so misconfiguration fails at startup.
    pub fn new(
        url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        max_size: u64,
    ) -> Result<Self, SourceError> {
        let url = url.into();
        validate_url(&url)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            url,
            client,
            max_size,
        })
    }

    /// Feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for WebFeedSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<FeedItem>, SourceError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size {
                return Err(SourceError::Invalid(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_size
                )));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() as u64 > self.max_size {
            return Err(SourceError::Invalid(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_size
            )));
        }

        let mut items = parse_feed(&bytes)?;
        items.truncate(limit);
        Ok(items)
    }
}

/// Validate a URL for SSRF protection.
///
/// This function checks that:
/// - The URL uses http or https scheme
/// - The host is not a private/loopback address
/// - The host is not a reserved hostname
pub fn validate_url(url: &str) -> Result<(), SourceError> {
    let parsed =
        url::Url::parse(url).map_err(|e| SourceError::Invalid(format!("invalid URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(SourceError::Invalid(format!(
                "unsupported URL scheme: {scheme}"
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| SourceError::Invalid("URL has no host".to_string()))?;

    let ip = match host {
        url::Host::Domain(domain) => {
            if is_forbidden_hostname(domain) {
                return Err(SourceError::Invalid(format!("forbidden host: {domain}")));
            }
            return Ok(());
        }
        url::Host::Ipv4(ipv4) => IpAddr::V4(ipv4),
        url::Host::Ipv6(ipv6) => IpAddr::V6(ipv6),
    };

    if is_private_ip(&ip) {
        return Err(SourceError::Invalid(format!(
            "private IP address not allowed: {ip}"
        )));
    }

    Ok(())
}

/// Check if a hostname is forbidden.
fn is_forbidden_hostname(host: &str) -> bool {
    const FORBIDDEN_SUFFIXES: [&str; 7] = [
        ".local",
        ".localhost",
        ".internal",
        ".intranet",
        ".corp",
        ".home",
        ".lan",
    ];

    let host = host.to_lowercase();
    host == "localhost" || FORBIDDEN_SUFFIXES.iter().any(|s| host.ends_with(s))
}

/// Check if an IP address is private/reserved.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            ipv4.is_loopback()
                || ipv4.is_private()
                || ipv4.is_link_local()
                || ipv4.is_broadcast()
                || ipv4.is_unspecified()
                || ipv4.is_documentation()
                // Carrier-grade NAT: 100.64.0.0/10
                || (octets[0] == 100 && (64..=127).contains(&octets[1]))
        }
        IpAddr::V6(ipv6) => {
            let first = ipv6.segments()[0];
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                // Unique local: fc00::/7
                || (first & 0xfe00) == 0xfc00
                // Link-local: fe80::/10
                || (first & 0xffc0) == 0xfe80
        }
    }
}

/// Parse feed bytes into items, newest first as published by the feed.
///
/// Entries without a publish or update date cannot be placed in the recency
/// window and are dropped.
fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>, SourceError> {
    let feed = parser::parse(bytes).map_err(|e| SourceError::Parse(e.to_string()))?;

    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let Some(created_at) = entry.published.or(entry.updated) else {
                debug!("Dropping feed entry {} without a date", entry.id);
                return None;
            };
            let title = entry
                .title
                .map(|t| t.content.split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            let url = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default();

            Some(FeedItem {
                id: entry.id,
                title,
                url,
                created_at,
            })
        })
        .collect();

    Ok(items)
}
