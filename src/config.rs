use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Chat that receives the periodic change digest. No chat, no relay.
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default = "default_relay_language")]
    pub target_language: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chat_id: None,
            target_language: default_relay_language(),
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslateConfig {
    #[serde(default = "default_translate_base_url")]
    pub base_url: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            base_url: default_translate_base_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
        }
    }
}

fn default_relay_language() -> String {
    "en".to_string()
}

fn default_interval_secs() -> u64 {
    600
}

fn default_feed_url() -> String {
    "https://en.wikipedia.org/w/api.php?action=query&list=recentchanges&rclimit=10\
     &rcprop=title|ids|sizes|flags|user&format=json"
        .to_string()
}

fn default_user_agent() -> String {
    concat!("relaybot/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_translate_base_url() -> String {
    "https://translate.googleapis.com".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bot.db")
}

impl Config {
    /// Load `path` if it exists, apply environment overrides, then validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Environment wins over the file. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup("RELAY_CHAT_ID") {
            self.relay.chat_id = Some(chat_id);
        }
        if let Some(lang) = lookup("RELAY_TARGET_LANGUAGE") {
            self.relay.target_language = lang;
        }
        if let Some(secs) = lookup("RELAY_INTERVAL_SECS") {
            self.relay.interval_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid RELAY_INTERVAL_SECS: {}", secs))?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.storage.database_path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!(
                "Missing bot token: set [telegram] bot_token or the TELEGRAM_BOT_TOKEN environment variable"
            );
        }
        if self.relay.interval_secs == 0 {
            anyhow::bail!("[relay] interval_secs must be greater than zero");
        }
        Ok(())
    }
}
