//! Subscriber types for giveaway-scout.

use std::fmt;
use std::str::FromStr;

use crate::ScoutError;

/// A destination channel handle (a Discord channel snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

impl ChannelId {
    /// Get the raw id.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Mention markup for this channel.
    pub fn mention(self) -> String {
        format!("<#{}>", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ChannelId)
            .map_err(|_| ScoutError::Validation(format!("invalid channel id: {s}")))
    }
}

/// A registered subscriber (a guild) and its destination channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    /// Opaque subscriber identifier (the guild id).
    pub subscriber_id: String,
    /// Channel that receives notifications.
    pub destination: ChannelId,
}

impl Subscriber {
    /// Create a new subscriber.
    pub fn new(subscriber_id: impl Into<String>, destination: ChannelId) -> Self {
        Self {
            subscriber_id: subscriber_id.into(),
            destination,
        }
    }
}
