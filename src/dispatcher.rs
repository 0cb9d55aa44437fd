use tracing::{debug, error, info};

use crate::commands::{self, Command};
use crate::context::BotContext;
use crate::platform::{BotIdentity, InboundMessage};

pub const HELP_TEXT: &str = "Available commands:\n\
    !recent - Get recent Wikipedia changes\n\
    !setLang [language_code] - Set your preferred language\n\
    !help - Show this help message";

pub const SET_LANG_USAGE: &str = "Usage: !setLang [language_code]";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Type !help for a list of available commands.";

pub const FETCH_ERROR_PREFIX: &str = "Error fetching recent changes: ";

/// Maps each inbound chat message to at most one reply.
/// Platform-agnostic — the caller delivers the reply.
pub struct CommandDispatcher {
    ctx: BotContext,
    identity: BotIdentity,
}

impl CommandDispatcher {
    pub fn new(ctx: BotContext, identity: BotIdentity) -> Self {
        Self { ctx, identity }
    }

    /// Process an inbound message and return the reply text, if any.
    pub async fn handle(&self, msg: &InboundMessage) -> Option<String> {
        if msg.author_is_bot || msg.author_id == self.identity.user_id {
            debug!("Ignoring message from bot account {}", msg.author_id);
            return None;
        }

        let Some(command) = commands::parse(&msg.text, &self.identity.mention) else {
            debug!("Empty message content from user {}", msg.author_id);
            return None;
        };

        info!("Processing {:?} from user {}", command, msg.author_id);

        let reply = match command {
            Command::Recent => self.recent(&msg.author_id).await,
            Command::SetLang(language) => self.set_lang(&msg.author_id, language).await,
            Command::Help => self.help(&msg.author_id).await,
            Command::Unknown(raw) => {
                debug!("Unknown command: {}", raw);
                UNKNOWN_COMMAND.to_string()
            }
        };
        Some(reply)
    }

    async fn recent(&self, user_id: &str) -> String {
        let lang = self.ctx.resolve_language(user_id).await;

        let changes = match self.ctx.feed.fetch().await {
            Ok(changes) => changes,
            Err(e) => {
                error!("Error fetching recent changes: {}", e);
                return format!("{}{}", FETCH_ERROR_PREFIX, e);
            }
        };

        self.ctx.translate_or_original(&changes, &lang).await
    }

    async fn set_lang(&self, user_id: &str, language: Option<String>) -> String {
        let Some(language) = language else {
            return SET_LANG_USAGE.to_string();
        };

        match self.ctx.store.set_language(user_id, &language).await {
            Ok(()) => {
                info!("User {} set language to {}", user_id, language);
                format!("Language set to {}", language)
            }
            Err(e) => {
                error!("Failed to set language for user {}: {}", user_id, e);
                format!("Failed to set language: {}", e)
            }
        }
    }

    async fn help(&self, user_id: &str) -> String {
        let lang = self.ctx.resolve_language(user_id).await;
        self.ctx.translate_or_original(HELP_TEXT, &lang).await
    }
}
