//! Discord REST client and payload types.

mod client;
pub mod types;

use thiserror::Error;

pub use client::DiscordClient;
pub use types::{CommandSpec, Interaction, InteractionResponse, ResponseMessage};

/// Discord API errors.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The bot token was rejected.
    #[error("bot token rejected")]
    Unauthorized,

    /// The channel does not exist or the bot cannot access it.
    #[error("channel unavailable")]
    ChannelUnavailable,

    /// Discord asked us to slow down.
    #[error("rate limited (retry after {retry_after}s)")]
    RateLimited { retry_after: f64 },

    /// Discord returned another error.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}
