//! Configuration module for giveaway-scout.

use serde::Deserialize;
use std::path::Path;

use crate::scan::DedupScope;
use crate::{Result, ScoutError};

/// Discord configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token used for REST calls.
    #[serde(default)]
    pub token: String,
    /// Hex-encoded application public key for interaction signatures.
    #[serde(default)]
    pub public_key: String,
    /// Register slash commands at startup.
    #[serde(default = "default_register_commands")]
    pub register_commands: bool,
    /// Base URL of the Discord REST API.
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_register_commands() -> bool {
    true
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            public_key: String::new(),
            register_commands: default_register_commands(),
            api_base: default_discord_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Reddit API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    /// OAuth client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// User agent sent with every request (required by Reddit).
    #[serde(default)]
    pub user_agent: String,
    /// Base URL for token requests.
    #[serde(default = "default_reddit_auth_base")]
    pub auth_base: String,
    /// Base URL for authenticated API requests.
    #[serde(default = "default_reddit_api_base")]
    pub api_base: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_reddit_auth_base() -> String {
    "https://www.reddit.com".to_string()
}

fn default_reddit_api_base() -> String {
    "https://oauth.reddit.com".to_string()
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: String::new(),
            auth_base: default_reddit_auth_base(),
            api_base: default_reddit_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Scanner configuration: what to watch and how often.
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Subreddit names to watch (without the `r/` prefix).
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
    /// RSS/Atom feed URLs to watch.
    #[serde(default)]
    pub feeds: Vec<String>,
    /// Keywords matched case-insensitively against item titles.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Poll interval in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Maximum item age in seconds.
    #[serde(default = "default_window")]
    pub window_secs: u64,
    /// Number of most recent items fetched per source.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    /// Per-source fetch timeout in seconds.
    #[serde(default = "default_source_timeout")]
    pub source_timeout_secs: u64,
    /// Delay after each source in seconds.
    #[serde(default = "default_source_delay")]
    pub source_delay_secs: u64,
    /// Dedup cache capacity.
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
    /// Whether dedup is shared by all subscribers or kept per subscriber.
    #[serde(default)]
    pub dedup_scope: DedupScope,
    /// Timezone used for the "Posted" timestamp (e.g., "UTC", "Asia/Kolkata").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Maximum RSS/Atom document size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
}

fn default_subreddits() -> Vec<String> {
    ["FreeGameGiveaway", "IndianGaming", "pcgaming", "SteamGiveaways"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_keywords() -> Vec<String> {
    [
        "giveaway",
        "free key",
        "steam key",
        "game key",
        "origin key",
        "giving away",
        "give away",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_interval() -> u64 {
    30
}

fn default_window() -> u64 {
    3600 // 1 hour
}

fn default_fetch_limit() -> usize {
    25
}

fn default_source_timeout() -> u64 {
    30
}

fn default_source_delay() -> u64 {
    2
}

fn default_dedup_capacity() -> usize {
    1000
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            subreddits: default_subreddits(),
            feeds: Vec::new(),
            keywords: default_keywords(),
            interval_secs: default_interval(),
            window_secs: default_window(),
            fetch_limit: default_fetch_limit(),
            source_timeout_secs: default_source_timeout(),
            source_delay_secs: default_source_delay(),
            dedup_capacity: default_dedup_capacity(),
            dedup_scope: DedupScope::default(),
            timezone: default_timezone(),
            max_feed_size_bytes: default_max_feed_size(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/giveaway-scout.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Interactions web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether the interactions endpoint is served.
    #[serde(default = "default_web_enabled")]
    pub enabled: bool,
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
}

fn default_web_enabled() -> bool {
    true
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: default_web_enabled(),
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file. Console only when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Discord configuration.
    #[serde(default)]
    pub discord: DiscordConfig,
    /// Reddit configuration.
    #[serde(default)]
    pub reddit: RedditConfig,
    /// Scanner configuration.
    #[serde(default)]
    pub scanner: ScannerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Web server configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ScoutError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    ///
    /// A missing file is not an error: defaults are used and the secrets are
    /// expected to come from the environment.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = match Self::load(path) {
            Ok(config) => config,
            Err(ScoutError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ScoutError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `DISCORD_TOKEN`
    /// - `DISCORD_PUBLIC_KEY`
    /// - `REDDIT_CLIENT_ID`
    /// - `REDDIT_CLIENT_SECRET`
    /// - `REDDIT_USER_AGENT`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 5] = [
            ("DISCORD_TOKEN", &mut self.discord.token),
            ("DISCORD_PUBLIC_KEY", &mut self.discord.public_key),
            ("REDDIT_CLIENT_ID", &mut self.reddit.client_id),
            ("REDDIT_CLIENT_SECRET", &mut self.reddit.client_secret),
            ("REDDIT_USER_AGENT", &mut self.reddit.user_agent),
        ];

        for (name, slot) in overrides {
            if let Ok(value) = std::env::var(name) {
                if !value.is_empty() {
                    *slot = value;
                }
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("discord.token (DISCORD_TOKEN)", &self.discord.token),
            ("reddit.client_id (REDDIT_CLIENT_ID)", &self.reddit.client_id),
            (
                "reddit.client_secret (REDDIT_CLIENT_SECRET)",
                &self.reddit.client_secret,
            ),
            ("reddit.user_agent (REDDIT_USER_AGENT)", &self.reddit.user_agent),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ScoutError::Validation(format!("{name} is not set")));
            }
        }

        if self.web.enabled && self.discord.public_key.trim().is_empty() {
            return Err(ScoutError::Validation(
                "web server is enabled but discord.public_key (DISCORD_PUBLIC_KEY) is not set"
                    .to_string(),
            ));
        }

        let scanner = &self.scanner;
        if scanner.subreddits.is_empty() && scanner.feeds.is_empty() {
            return Err(ScoutError::Validation(
                "at least one subreddit or feed must be configured".to_string(),
            ));
        }
        if scanner.subreddits.iter().any(|s| s.trim().is_empty()) {
            return Err(ScoutError::Validation(
                "subreddit names must not be empty".to_string(),
            ));
        }
        if let Some(bad) = scanner
            .subreddits
            .iter()
            .find(|s| !is_valid_subreddit_name(s))
        {
            return Err(ScoutError::Validation(format!(
                "invalid subreddit name: {bad} (letters, digits and underscores only)"
            )));
        }
        if scanner.keywords.is_empty() {
            return Err(ScoutError::Validation(
                "at least one keyword must be configured".to_string(),
            ));
        }
        if scanner.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ScoutError::Validation(
                "keywords must not be empty".to_string(),
            ));
        }
        if scanner.interval_secs == 0 {
            return Err(ScoutError::Validation(
                "scanner.interval_secs must be greater than zero".to_string(),
            ));
        }
        if scanner.fetch_limit == 0 {
            return Err(ScoutError::Validation(
                "scanner.fetch_limit must be greater than zero".to_string(),
            ));
        }
        if scanner.dedup_capacity == 0 {
            return Err(ScoutError::Validation(
                "scanner.dedup_capacity must be greater than zero".to_string(),
            ));
        }
        if scanner.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ScoutError::Validation(format!(
                "unknown timezone: {}",
                scanner.timezone
            )));
        }

        Ok(())
    }
}

/// A subreddit name, optionally prefixed with `r/`, made of `[A-Za-z0-9_]`.
fn is_valid_subreddit_name(name: &str) -> bool {
    let name = name.trim();
    let name = name.strip_prefix("r/").unwrap_or(name);
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
