//! Poll cycle errors.

use thiserror::Error;

use crate::notify::DeliveryError;
use crate::registry::ChannelId;
use crate::source::SourceError;
use crate::ScoutError;

/// How much of the current cycle a failure invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecoveryScope {
    /// Skip one item; continue with the next.
    Item,
    /// Skip the remainder of one subscriber's items.
    Subscriber,
    /// Skip one source; continue with the next.
    Source,
    /// Abandon the cycle; the next tick retries.
    Cycle,
}

/// Errors raised while running a poll cycle.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The subscriber snapshot could not be loaded.
    #[error("failed to load subscribers: {0}")]
    Registry(#[source] ScoutError),

    /// A subscriber's destination could not be resolved.
    #[error("destination {channel} for {subscriber_id} unavailable: {reason}")]
    Destination {
        subscriber_id: String,
        channel: ChannelId,
        reason: String,
    },

    /// A source failed to produce items.
    #[error("source {source_name} failed: {error}")]
    Source {
        source_name: String,
        #[source]
        error: SourceError,
    },

    /// A notification could not be delivered.
    #[error("delivery to {subscriber_id} failed: {error}")]
    Delivery {
        subscriber_id: String,
        #[source]
        error: DeliveryError,
    },
}

impl ScanError {
    /// The part of the cycle abandoned by this error.
    pub fn scope(&self) -> RecoveryScope {
        match self {
            ScanError::Registry(_) => RecoveryScope::Cycle,
            ScanError::Destination { .. } => RecoveryScope::Subscriber,
            ScanError::Source { .. } => RecoveryScope::Source,
            ScanError::Delivery { error, .. } if error.is_destination_gone() => {
                RecoveryScope::Subscriber
            }
            ScanError::Delivery { .. } => RecoveryScope::Item,
        }
    }
}
