//! Notification delivery for giveaway-scout.

mod discord;

use async_trait::async_trait;
use thiserror::Error;

pub use discord::DiscordNotifier;

use crate::registry::ChannelId;

/// Delivery errors.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The destination no longer exists or is not reachable by the bot.
    #[error("destination {0} is unavailable")]
    DestinationGone(ChannelId),

    /// Any other failure while delivering.
    #[error("delivery failed: {0}")]
    Failed(String),
}

impl DeliveryError {
    /// Whether further sends to the same destination are pointless this cycle.
    pub fn is_destination_gone(&self) -> bool {
        matches!(self, DeliveryError::DestinationGone(_))
    }
}

/// Delivers formatted notifications to destination channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Check whether a destination can currently receive messages.
    ///
    /// Returns a display name for the destination when it resolves.
    async fn resolve_channel(&self, channel: ChannelId) -> Result<Option<String>, DeliveryError>;

    /// Send a text message to a destination.
    async fn send_message(&self, channel: ChannelId, text: &str) -> Result<(), DeliveryError>;
}
