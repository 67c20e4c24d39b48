mod bot;
mod commands;
mod config;
mod dispatcher;
mod logs;
mod memory;
mod platform;
mod polling;
mod stickers;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bot::Bot;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::logs::{file_layer, LogCollector};
use crate::memory::{DurableRoster, RosterStore};
use crate::platform::telegram::TelegramClient;

/// Telegram bot that keeps a roll roster for the shaverma run
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Bot API token
    token: String,

    /// Optional settings file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    // Initialize logging: console, plus the operational log file /logs reads from
    let logs = LogCollector::new(config.logging.log_path());
    let log_file = logs.open_writer()?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,shaverma_bot=debug".into()))
        .with(fmt::layer())
        .with(log_file.map(file_layer))
        .init();

    info!("====== RESTART ======");
    info!("Bot started!");
    match logs.path() {
        Some(path) => info!("  Log file: {}", path.display()),
        None => info!("  Log file: disabled"),
    }

    let durable = DurableRoster::open(&config.storage.database_path)?;
    info!("Overall db: {:?}", durable.all()?);

    let dispatcher = Dispatcher::new(RosterStore::new(durable), logs);
    let api = TelegramClient::new(&config.telegram, &cli.token)?;

    Bot::new(api, dispatcher, &config.telegram).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_required() {
        assert!(Cli::try_parse_from(["shaverma-bot"]).is_err());

        let cli = Cli::try_parse_from(["shaverma-bot", "TOKEN"]).unwrap();
        assert_eq!(cli.token, "TOKEN");
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_config_flag() {
        let cli =
            Cli::try_parse_from(["shaverma-bot", "TOKEN", "--config", "/etc/bot.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/bot.toml"));
    }
}
