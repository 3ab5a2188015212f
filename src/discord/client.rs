use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{Application, Channel, CommandSpec, CurrentUser};
use super::DiscordError;
use crate::config::DiscordConfig;
use crate::registry::ChannelId;

/// Discord JSON error code for "Unknown Channel".
const UNKNOWN_CHANNEL: u64 = 10003;

/// Discord JSON error code for "Missing Access".
const MISSING_ACCESS: u64 = 50001;

/// Discord REST API client authenticated as a bot.
pub struct DiscordClient {
    client: Client,
    api_base: String,
    token: String,
}

impl DiscordClient {
    /// Create a new client from configuration. No request is made.
    pub fn new(config: &DiscordConfig) -> Result<Self, DiscordError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!(
                "DiscordBot (https://github.com/giveaway-scout, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Get the bot user. Fails with `Unauthorized` for a bad token.
    pub async fn current_user(&self) -> Result<CurrentUser, DiscordError> {
        let resp = self
            .client
            .get(self.url("/users/@me"))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        json_or_error(resp).await
    }

    /// Get the application the bot belongs to.
    pub async fn current_application(&self) -> Result<Application, DiscordError> {
        let resp = self
            .client
            .get(self.url("/applications/@me"))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;
        json_or_error(resp).await
    }

    /// Look up a channel. Returns `None` if it no longer exists or the bot
    /// cannot see it.
    pub async fn get_channel(&self, channel_id: ChannelId) -> Result<Option<Channel>, DiscordError> {
        let resp = self
            .client
            .get(self.url(&format!("/channels/{channel_id}")))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        match json_or_error(resp).await {
            Ok(channel) => Ok(Some(channel)),
            Err(DiscordError::ChannelUnavailable) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Post a text message to a channel.
    pub async fn create_message(&self, channel_id: ChannelId, content: &str) -> Result<(), DiscordError> {
        let resp = self
            .client
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&json!({ "content": content }))
            .send()
            .await?;

        check_status(resp).await.map(|_| ())
    }

    /// Replace the application's global slash commands.
    pub async fn register_commands(
        &self,
        application_id: &str,
        commands: &[CommandSpec],
    ) -> Result<(), DiscordError> {
        let resp = self
            .client
            .put(self.url(&format!("/applications/{application_id}/commands")))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(commands)
            .send()
            .await?;

        check_status(resp).await.map(|_| ())
    }
}

/// Map a non-success response to a `DiscordError`.
async fn check_status(resp: Response) -> Result<Response, DiscordError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(DiscordError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let retry_after = body
                .get("retry_after")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0);
            Err(DiscordError::RateLimited { retry_after })
        }
        StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let code = body.get("code").and_then(|v| v.as_u64()).unwrap_or(0);
            if status == StatusCode::NOT_FOUND || code == UNKNOWN_CHANNEL || code == MISSING_ACCESS
            {
                Err(DiscordError::ChannelUnavailable)
            } else {
                Err(DiscordError::Api {
                    status: status.as_u16(),
                    message: body.to_string(),
                })
            }
        }
        _ => {
            let message = resp.text().await.unwrap_or_default();
            Err(DiscordError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

async fn json_or_error<T: DeserializeOwned>(resp: Response) -> Result<T, DiscordError> {
    let resp = check_status(resp).await?;
    Ok(resp.json().await?)
}
