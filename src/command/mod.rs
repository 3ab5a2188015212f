//! Bot commands for giveaway-scout.
//!
//! Commands arrive as Discord slash-command interactions. The legacy
//! `!name` prefix form is accepted by the parser as well.

pub mod handler;

use thiserror::Error;

pub use handler::CommandHandler;

use crate::discord::types::{CommandSpec, ADMINISTRATOR};
use crate::ScoutError;

/// Reply sent after a destination is stored.
pub const REPLY_CHANNEL_SET: &str = "✅ Giveaway notifications will now be sent to this channel!";

/// Reply sent when the invoker lacks the required permission.
pub const REPLY_PERMISSION_DENIED: &str = "❌ You don't have permission to use this command!";

/// Reply sent for unknown commands.
pub const REPLY_NOT_FOUND: &str = "❌ Command not found!";

/// Reply sent for every other failure.
pub const REPLY_ERROR: &str = "❌ An error occurred while processing the command.";

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Use the invoking channel as the guild's destination.
    SetChannel,
    /// Show the guild's settings.
    Settings,
    /// Show the command list.
    Commands,
    /// Unknown command.
    Unknown(String),
}

impl BotCommand {
    /// Parse a command name, with or without a leading `!` or `/`.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let name = trimmed
            .strip_prefix('!')
            .or_else(|| trimmed.strip_prefix('/'))
            .unwrap_or(trimmed);
        let name = name.split_whitespace().next().unwrap_or("");

        match name.to_lowercase().as_str() {
            "setchannel" => BotCommand::SetChannel,
            "settings" => BotCommand::Settings,
            "commands" => BotCommand::Commands,
            _ => BotCommand::Unknown(name.to_string()),
        }
    }

    /// Get the command name.
    pub fn name(&self) -> &str {
        match self {
            BotCommand::SetChannel => "setchannel",
            BotCommand::Settings => "settings",
            BotCommand::Commands => "commands",
            BotCommand::Unknown(name) => name,
        }
    }

    /// Whether the command requires the Administrator permission.
    pub fn requires_admin(&self) -> bool {
        matches!(self, BotCommand::SetChannel | BotCommand::Settings)
    }
}

impl std::fmt::Display for BotCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// Command-handling errors.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing Administrator permission")]
    PermissionDenied,

    #[error("unknown command: {0}")]
    NotFound(String),

    #[error("command used outside a guild")]
    NotInGuild,

    #[error("interaction carries no usable channel id")]
    MissingChannel,

    #[error(transparent)]
    Internal(#[from] ScoutError),
}

impl CommandError {
    /// The text shown to the invoker.
    pub fn user_message(&self) -> &'static str {
        match self {
            CommandError::PermissionDenied => REPLY_PERMISSION_DENIED,
            CommandError::NotFound(_) => REPLY_NOT_FOUND,
            _ => REPLY_ERROR,
        }
    }
}

/// Command information for help display.
pub struct CommandInfo {
    pub name: &'static str,
    pub syntax: &'static str,
    pub description: &'static str,
    pub admin_only: bool,
}

/// Get all available command information.
pub fn command_help() -> Vec<CommandInfo> {
    vec![
        CommandInfo {
            name: "setchannel",
            syntax: "/setchannel",
            description: "Set the current channel for giveaway notifications (Admin only)",
            admin_only: true,
        },
        CommandInfo {
            name: "settings",
            syntax: "/settings",
            description: "Show current bot settings (Admin only)",
            admin_only: true,
        },
        CommandInfo {
            name: "commands",
            syntax: "/commands",
            description: "Show this help message",
            admin_only: false,
        },
    ]
}

/// Slash command definitions for registration.
pub fn command_specs() -> Vec<CommandSpec> {
    command_help()
        .into_iter()
        .map(|info| CommandSpec {
            name: info.name.to_string(),
            description: info.description.to_string(),
            default_member_permissions: info.admin_only.then(|| ADMINISTRATOR.to_string()),
            dm_permission: !info.admin_only,
        })
        .collect()
}
