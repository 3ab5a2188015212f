//! Command execution.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{command_help, BotCommand, CommandError, REPLY_CHANNEL_SET};
use crate::discord::types::{Embed, EmbedField, Interaction, ResponseMessage};
use crate::notify::Notifier;
use crate::registry::{ChannelId, SubscriberRegistry};

/// Embed color for the settings view.
pub const SETTINGS_COLOR: u32 = 0x3498db;

/// Embed color for the command list.
pub const COMMANDS_COLOR: u32 = 0x2ecc71;

/// Discord's limit on an embed field value, in characters.
pub const MAX_FIELD_VALUE_LENGTH: usize = 1024;

/// Who invoked a command, and where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandContext {
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub is_admin: bool,
}

impl CommandContext {
    pub fn from_interaction(interaction: &Interaction) -> Self {
        Self {
            guild_id: interaction.guild_id.clone(),
            channel_id: interaction.channel_id.clone(),
            is_admin: interaction
                .member
                .as_ref()
                .map(|m| m.is_administrator())
                .unwrap_or(false),
        }
    }
}

/// Executes bot commands against the registry.
pub struct CommandHandler {
    registry: Arc<dyn SubscriberRegistry>,
    notifier: Arc<dyn Notifier>,
    sources: Vec<String>,
    keywords: Vec<String>,
}

impl CommandHandler {
    /// Create a handler. `sources` are display names (`r/name` or a feed URL).
    pub fn new(
        registry: Arc<dyn SubscriberRegistry>,
        notifier: Arc<dyn Notifier>,
        sources: Vec<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            registry,
            notifier,
            sources,
            keywords,
        }
    }

    /// Handle an APPLICATION_COMMAND interaction and build the reply.
    pub async fn handle_interaction(&self, interaction: &Interaction) -> ResponseMessage {
        let name = interaction
            .data
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("");
        let ctx = CommandContext::from_interaction(interaction);
        self.handle(BotCommand::parse(name), &ctx).await
    }

    /// Run a command; failures are turned into the user-facing reply.
    pub async fn handle(&self, command: BotCommand, ctx: &CommandContext) -> ResponseMessage {
        match self.execute(&command, ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    CommandError::PermissionDenied | CommandError::NotFound(_) => {
                        info!("Command {} rejected: {}", command, e)
                    }
                    _ => error!("Command error: {}", e),
                }
                text(e.user_message())
            }
        }
    }

    async fn execute(
        &self,
        command: &BotCommand,
        ctx: &CommandContext,
    ) -> Result<ResponseMessage, CommandError> {
        if let BotCommand::Unknown(name) = command {
            return Err(CommandError::NotFound(name.clone()));
        }

        if command.requires_admin() {
            if ctx.guild_id.is_none() {
                return Err(CommandError::NotInGuild);
            }
            if !ctx.is_admin {
                return Err(CommandError::PermissionDenied);
            }
        }

        match command {
            BotCommand::SetChannel => self.set_channel(ctx).await,
            BotCommand::Settings => self.settings(ctx).await,
            BotCommand::Commands => Ok(commands_embed()),
            BotCommand::Unknown(name) => Err(CommandError::NotFound(name.clone())),
        }
    }

    async fn set_channel(&self, ctx: &CommandContext) -> Result<ResponseMessage, CommandError> {
        let guild_id = ctx.guild_id.as_deref().ok_or(CommandError::NotInGuild)?;
        let channel: ChannelId = ctx
            .channel_id
            .as_deref()
            .ok_or(CommandError::MissingChannel)?
            .parse()
            .map_err(|_| CommandError::MissingChannel)?;

        self.registry.set_destination(guild_id, channel).await?;
        info!("Guild {} now notifies channel {}", guild_id, channel);

        Ok(text(REPLY_CHANNEL_SET))
    }

    async fn settings(&self, ctx: &CommandContext) -> Result<ResponseMessage, CommandError> {
        let guild_id = ctx.guild_id.as_deref().ok_or(CommandError::NotInGuild)?;

        let channel = match self.registry.get_destination(guild_id).await? {
            Some(channel) => match self.notifier.resolve_channel(channel).await {
                Ok(Some(_)) => channel.mention(),
                Ok(None) => "Not set".to_string(),
                Err(e) => {
                    warn!("Could not resolve channel {}: {}", channel, e);
                    "Not set".to_string()
                }
            },
            None => "Not set".to_string(),
        };

        let embed = Embed {
            title: "Bot Settings".to_string(),
            color: SETTINGS_COLOR,
            fields: vec![
                field("Notification Channel", channel),
                field("Monitored Sources", self.sources.join("\n")),
                field("Keywords", self.keywords.join(", ")),
            ],
        };

        Ok(ResponseMessage {
            content: None,
            embeds: vec![embed],
        })
    }
}

fn commands_embed() -> ResponseMessage {
    let fields = command_help()
        .into_iter()
        .map(|info| field(info.syntax, info.description.to_string()))
        .collect();

    ResponseMessage {
        content: None,
        embeds: vec![Embed {
            title: "Bot Commands".to_string(),
            color: COMMANDS_COLOR,
            fields,
        }],
    }
}

fn field(name: &str, value: String) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: cap_field_value(value),
        inline: false,
    }
}

/// Cut a value Discord would reject, marking the cut with an ellipsis.
fn cap_field_value(value: String) -> String {
    if value.chars().count() <= MAX_FIELD_VALUE_LENGTH {
        return value;
    }
    let mut capped: String = value.chars().take(MAX_FIELD_VALUE_LENGTH - 1).collect();
    capped.push('…');
    capped
}

fn text(content: &str) -> ResponseMessage {
    ResponseMessage {
        content: Some(content.to_string()),
        embeds: Vec::new(),
    }
}
