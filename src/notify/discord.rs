use std::sync::Arc;

use async_trait::async_trait;

use super::{DeliveryError, Notifier};
use crate::discord::{DiscordClient, DiscordError};
use crate::registry::ChannelId;

/// Notifier posting to Discord text channels.
pub struct DiscordNotifier {
    client: Arc<DiscordClient>,
}

impl DiscordNotifier {
    pub fn new(client: Arc<DiscordClient>) -> Self {
        Self { client }
    }
}

fn delivery_error(channel: ChannelId, err: DiscordError) -> DeliveryError {
    match err {
        DiscordError::ChannelUnavailable => DeliveryError::DestinationGone(channel),
        other => DeliveryError::Failed(other.to_string()),
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn resolve_channel(&self, channel: ChannelId) -> Result<Option<String>, DeliveryError> {
        let found = self
            .client
            .get_channel(channel)
            .await
            .map_err(|e| delivery_error(channel, e))?;

        Ok(found.map(|c| c.name.map(|n| format!("#{n}")).unwrap_or(c.id)))
    }

    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), DeliveryError> {
        self.client
            .create_message(channel, text)
            .await
            .map_err(|e| delivery_error(channel, e))
    }
}
