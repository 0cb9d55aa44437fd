pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A message received from the chat platform
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Platform-specific user ID as string
    pub author_id: String,
    pub author_is_bot: bool,
    /// The message text
    pub text: String,
    /// Platform-specific chat/channel ID as string
    pub chat_id: String,
}

/// Who the bot is on the platform, used to ignore its own messages and mentions.
#[derive(Debug, Clone, Default)]
pub struct BotIdentity {
    pub user_id: String,
    /// Mention token as typed by users, e.g. `@relay_bot`. Empty if the bot has no username.
    pub mention: String,
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()>;
}
