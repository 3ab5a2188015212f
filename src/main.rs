use std::process::ExitCode;

use tracing::{error, info};

use giveaway_scout::Config;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Secrets may live in a .env file
    let _ = dotenvy::dotenv();

    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = giveaway_scout::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        giveaway_scout::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!("giveaway-scout {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Watching {} subreddit(s) and {} feed(s) for {} keyword(s)",
        config.scanner.subreddits.len(),
        config.scanner.feeds.len(),
        config.scanner.keywords.len()
    );

    match giveaway_scout::app::run(config).await {
        Ok(()) => {
            info!("Shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}
