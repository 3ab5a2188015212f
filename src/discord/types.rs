//! Discord API payload types.
//!
//! Only the fields this bot reads are modeled.

use serde::{Deserialize, Serialize};

/// Administrator permission bit.
pub const ADMINISTRATOR: u64 = 1 << 3;

/// Interaction type: PING.
pub const INTERACTION_PING: u8 = 1;

/// Interaction type: APPLICATION_COMMAND.
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

/// Interaction response type: PONG.
pub const RESPONSE_PONG: u8 = 1;

/// Interaction response type: CHANNEL_MESSAGE_WITH_SOURCE.
pub const RESPONSE_CHANNEL_MESSAGE: u8 = 4;

/// The authenticated bot user.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

/// The bot's application.
#[derive(Debug, Clone, Deserialize)]
pub struct Application {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A channel as returned by `GET /channels/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// A slash command definition for registration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    /// Permission bitfield (as a string) required by default, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
    /// Whether the command is available in DMs.
    pub dm_permission: bool,
}

/// Incoming interaction (only the fields used here).
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
}

/// Command data of an APPLICATION_COMMAND interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionData {
    pub name: String,
}

/// Guild member who invoked the interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    /// Computed permissions of the member in the channel, as a decimal string.
    #[serde(default)]
    pub permissions: Option<String>,
    #[serde(default)]
    pub user: Option<MemberUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberUser {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

impl Member {
    /// Whether the member holds the Administrator permission.
    pub fn is_administrator(&self) -> bool {
        self.permissions
            .as_deref()
            .and_then(|p| p.parse::<u64>().ok())
            .map(|bits| bits & ADMINISTRATOR == ADMINISTRATOR)
            .unwrap_or(false)
    }
}

/// An embed field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A rich embed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

/// Message body of an interaction response.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct ResponseMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

/// Interaction response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseMessage>,
}

impl InteractionResponse {
    /// PONG response to a PING.
    pub fn pong() -> Self {
        Self {
            kind: RESPONSE_PONG,
            data: None,
        }
    }

    /// Channel message response.
    pub fn message(message: ResponseMessage) -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(message),
        }
    }
}
