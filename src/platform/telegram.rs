use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dispatcher::CommandDispatcher;
use crate::platform::{BotIdentity, ChatSender, InboundMessage};

/// Telegram rejects messages above 4096 chars; stay below it.
const MAX_MESSAGE_LEN: usize = 4000;

/// Split text into chunks of at most `max_len` bytes, preferring newline then
/// space boundaries. A chunk always holds at least one char, even if that char
/// is wider than `max_len`.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > max_len {
        let mut cut = max_len;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }

        let head = &rest[..cut];
        let split_at = head
            .rfind('\n')
            .or_else(|| head.rfind(' '))
            .map(|pos| pos + 1)
            .unwrap_or(cut);

        chunks.push(rest[..split_at].to_string());
        rest = &rest[split_at..];
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Ask Telegram who we are.
pub async fn identity(bot: &Bot) -> Result<BotIdentity> {
    let me = bot.get_me().await.context("Failed to fetch bot identity")?;
    Ok(BotIdentity {
        user_id: me.id.0.to_string(),
        mention: me
            .username
            .as_ref()
            .map(|name| format!("@{}", name))
            .unwrap_or_default(),
    })
}

/// Start receiving updates in the background.
///
/// The returned token stops the update listener; the handle completes once it has.
pub fn spawn(bot: Bot, commands: Arc<CommandDispatcher>) -> (ShutdownToken, JoinHandle<()>) {
    info!("Starting Telegram platform...");

    let handler = Update::filter_message().endpoint(handle_message);

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![commands])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build();

    let token = dispatcher.shutdown_token();
    let handle = tokio::spawn(async move {
        dispatcher.dispatch().await;
    });

    (token, handle)
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    commands: Arc<CommandDispatcher>,
) -> ResponseResult<()> {
    let user = match msg.from.as_ref() {
        Some(user) => user,
        None => return Ok(()),
    };

    let text = match msg.text() {
        Some(t) => t.to_string(),
        None => return Ok(()),
    };

    info!(
        "Telegram message from {} ({}): {}",
        user.first_name, user.id.0, text
    );

    let incoming = InboundMessage {
        author_id: user.id.0.to_string(),
        author_is_bot: user.is_bot,
        text,
        chat_id: msg.chat.id.0.to_string(),
    };

    if let Some(reply) = commands.handle(&incoming).await {
        for chunk in split_message(&reply, MAX_MESSAGE_LEN) {
            bot.send_message(msg.chat.id, chunk).await?;
        }
    }

    Ok(())
}

/// Sends to arbitrary chats by numeric id; used by the relay loop.
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatSender for TelegramSender {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        let id: i64 = chat_id
            .trim()
            .parse()
            .with_context(|| format!("Invalid Telegram chat id: {}", chat_id))?;

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            self.bot
                .send_message(ChatId(id), chunk)
                .await
                .with_context(|| format!("Failed to send message to chat {}", chat_id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_single_chunk() {
        assert_eq!(split_message("hello", 10), vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_prefers_newlines() {
        let text = "- Title: A, User: u1\n- Title: B, User: u2\n";
        let chunks = split_message(text, 25);
        assert_eq!(chunks[0], "- Title: A, User: u1\n");
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let text = "ééééééééééé";
        let chunks = split_message(text, 5);
        assert!(chunks.iter().all(|c| c.len() <= 5));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_makes_progress_when_limit_is_below_char_width() {
        let chunks = split_message("éé", 1);
        assert_eq!(chunks, vec!["é".to_string(), "é".to_string()]);
    }

    #[test]
    fn test_split_falls_back_to_spaces() {
        let chunks = split_message("aaa bbb ccc", 8);
        assert_eq!(chunks, vec!["aaa bbb ".to_string(), "ccc".to_string()]);
    }

    #[tokio::test]
    async fn test_sender_rejects_non_numeric_chat_id() {
        let sender = TelegramSender::new(Bot::new("0:test"));
        let err = sender.send("general", "hi").await.unwrap_err();
        assert!(err.to_string().contains("Invalid Telegram chat id"));
    }
}
