//! Subscriber registry for giveaway-scout.
//!
//! Maps a subscriber (guild) to the channel that receives its notifications.
//! At most one destination is stored per subscriber; writes are upserts.

pub mod repository;
pub mod types;

use async_trait::async_trait;

pub use repository::SqliteSubscriberRegistry;
pub use types::{ChannelId, Subscriber};

use crate::Result;

/// Durable subscriber -> destination mapping.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Get the destination configured for a subscriber.
    async fn get_destination(&self, subscriber_id: &str) -> Result<Option<ChannelId>>;

    /// Set (or replace) the destination for a subscriber.
    async fn set_destination(&self, subscriber_id: &str, destination: ChannelId) -> Result<()>;

    /// Snapshot of every subscriber with a destination.
    async fn list_subscribers(&self) -> Result<Vec<Subscriber>>;
}
