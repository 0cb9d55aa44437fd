mod commands;
mod config;
mod context;
mod dispatcher;
mod error;
mod feed;
mod platform;
mod relay;
mod storage;
#[cfg(test)]
mod test_utils;
mod translate;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::context::BotContext;
use crate::dispatcher::CommandDispatcher;
use crate::feed::FeedClient;
use crate::platform::telegram::{self, TelegramSender};
use crate::relay::RelayLoop;
use crate::storage::SqliteStore;
use crate::translate::GoogleTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,relaybot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Database: {}", config.storage.database_path.display());
    info!("  Feed: {}", config.feed.url);
    info!("  Relay chat: {:?}", config.relay.chat_id);
    info!("  Relay language: {}", config.relay.target_language);

    let store = SqliteStore::open(&config.storage.database_path)?;

    let ctx = BotContext::new(
        Arc::new(store.clone()),
        Arc::new(FeedClient::new(config.feed.clone())),
        Arc::new(GoogleTranslator::new(config.translate.clone())),
    );

    let bot = teloxide::Bot::new(&config.telegram.bot_token);
    let identity = telegram::identity(&bot).await?;
    info!("Bot identity: {} ({})", identity.mention, identity.user_id);

    let commands = Arc::new(CommandDispatcher::new(ctx.clone(), identity));
    let (gateway, gateway_handle) = telegram::spawn(bot.clone(), commands);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let relay_handle = match config.relay.chat_id.clone() {
        Some(chat_id) => {
            let relay = RelayLoop::new(
                ctx,
                Arc::new(TelegramSender::new(bot)),
                chat_id,
                config.relay.target_language.clone(),
            )
            .with_period(Duration::from_secs(config.relay.interval_secs));
            Some(tokio::spawn(relay.run(shutdown_rx)))
        }
        None => {
            warn!("No relay chat configured; periodic relay disabled");
            None
        }
    };

    info!("Bot is running");
    wait_for_shutdown_signal().await?;
    info!("Shutting down bot");

    // Gateway first, so no handler touches the store after it is closed.
    match gateway.shutdown() {
        Ok(stopped) => {
            stopped.await;
            if let Err(e) = gateway_handle.await {
                warn!("Telegram task ended abnormally: {}", e);
            }
        }
        Err(e) => {
            warn!("Telegram dispatcher was not running: {}", e);
            gateway_handle.abort();
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(handle) = relay_handle {
        if let Err(e) = handle.await {
            warn!("Relay task ended abnormally: {}", e);
        }
    }

    store.close().await?;
    info!("Shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.context("Failed to listen for ctrl-c")?,
        _ = terminate.recv() => info!("Received SIGTERM"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")
}
