//! Application wiring and lifecycle.
//!
//! Startup authenticates against Discord and Reddit, then runs the poll
//! scheduler and the interactions server until ctrl-c or a server failure.
//! The database pool is closed and the Reddit token revoked on every exit
//! path once they have been acquired.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::command::{command_specs, CommandHandler};
use crate::config::Config;
use crate::db::Database;
use crate::discord::DiscordClient;
use crate::notify::{DiscordNotifier, Notifier};
use crate::registry::{SqliteSubscriberRegistry, SubscriberRegistry};
use crate::scan::{spawn_scheduler, DispatchSettings, PollDispatcher, ReadinessGate};
use crate::source::{FeedSource, RedditClient, RedditSource, WebFeedSource};
use crate::web::{AppState, InteractionVerifier, WebServer};
use crate::Result;

/// The running bot and the resources it owns.
pub struct Application {
    config: Config,
    db: Database,
    discord: Arc<DiscordClient>,
    reddit: Arc<RedditClient>,
}

impl Application {
    /// Build clients and open the database. No network request is made.
    pub async fn new(config: Config) -> Result<Self> {
        let discord = Arc::new(DiscordClient::new(&config.discord)?);
        let reddit = Arc::new(RedditClient::new(&config.reddit)?);
        let db = Database::open(&config.database.path).await?;

        Ok(Self {
            config,
            db,
            discord,
            reddit,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Run until shutdown. Returns an error for fatal startup failures.
    pub async fn run(&self) -> Result<()> {
        let registry: Arc<dyn SubscriberRegistry> =
            Arc::new(SqliteSubscriberRegistry::new(self.db.pool().clone()));
        let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(self.discord.clone()));
        let sources = build_sources(&self.config, &self.reddit)?;
        let source_names = sources.iter().map(|s| s.name().to_string()).collect();

        let dispatcher = PollDispatcher::new(
            registry.clone(),
            notifier.clone(),
            sources,
            &self.config.scanner.keywords,
            DispatchSettings::from_config(&self.config.scanner),
        )?;
        let commands = Arc::new(CommandHandler::new(
            registry,
            notifier,
            source_names,
            self.config.scanner.keywords.clone(),
        ));

        let gate = ReadinessGate::new();
        let scheduler = spawn_scheduler(
            dispatcher,
            Duration::from_secs(self.config.scanner.interval_secs),
            gate.clone(),
        );

        let result = self.serve(&gate, commands).await;

        scheduler.shutdown().await;
        result
    }

    async fn serve(&self, gate: &ReadinessGate, commands: Arc<CommandHandler>) -> Result<()> {
        self.authenticate().await?;
        gate.open();

        if !self.config.web.enabled {
            wait_for_ctrl_c().await;
            return Ok(());
        }

        let verifier = InteractionVerifier::from_hex(&self.config.discord.public_key)?;
        let state = Arc::new(AppState::new(verifier, commands));
        WebServer::new(&self.config.web, state)?
            .run(wait_for_ctrl_c())
            .await
    }

    async fn authenticate(&self) -> Result<()> {
        let user = self.discord.current_user().await?;
        info!("Logged in to Discord as {} ({})", user.username, user.id);

        self.reddit.authenticate().await?;
        info!("Authenticated with Reddit");

        if self.config.discord.register_commands {
            if let Err(e) = self.register_commands().await {
                warn!("Failed to register slash commands: {}", e);
            }
        }

        Ok(())
    }

    async fn register_commands(&self) -> Result<()> {
        let application = self.discord.current_application().await?;
        let specs = command_specs();
        self.discord
            .register_commands(&application.id, &specs)
            .await?;
        info!("Registered {} slash command(s)", specs.len());
        Ok(())
    }

    /// Revoke the Reddit token and close the database pool.
    pub async fn close(&self) {
        self.reddit.close().await;
        self.db.close().await;
        info!("Resources released");
    }
}

/// Build the configured sources: subreddits first, then feeds.
pub fn build_sources(
    config: &Config,
    reddit: &Arc<RedditClient>,
) -> Result<Vec<Arc<dyn FeedSource>>> {
    let scanner = &config.scanner;
    let mut sources: Vec<Arc<dyn FeedSource>> = scanner
        .subreddits
        .iter()
        .map(|sub| Arc::new(RedditSource::new(reddit.clone(), sub)) as Arc<dyn FeedSource>)
        .collect();

    for url in &scanner.feeds {
        let source = WebFeedSource::new(
            url.as_str(),
            &config.reddit.user_agent,
            Duration::from_secs(scanner.source_timeout_secs),
            scanner.max_feed_size_bytes,
        )?;
        sources.push(Arc::new(source));
    }

    Ok(sources)
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Run the bot with a validated configuration.
pub async fn run(config: Config) -> Result<()> {
    let app = Application::new(config).await?;
    let result = app.run().await;
    app.close().await;
    result
}
