use std::sync::Arc;

use tracing::warn;

use crate::feed::ChangeFeed;
use crate::storage::{LanguageStore, DEFAULT_LANGUAGE};
use crate::translate::Translator;

/// Handles to the collaborators shared by the command dispatcher and the relay loop.
#[derive(Clone)]
pub struct BotContext {
    pub store: Arc<dyn LanguageStore>,
    pub feed: Arc<dyn ChangeFeed>,
    pub translator: Arc<dyn Translator>,
}

impl BotContext {
    pub fn new(
        store: Arc<dyn LanguageStore>,
        feed: Arc<dyn ChangeFeed>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            store,
            feed,
            translator,
        }
    }

    /// The user's stored language, or the default.
    ///
    /// A missing preference and a failed lookup both yield the default; callers
    /// cannot tell them apart.
    pub async fn resolve_language(&self, user_id: &str) -> String {
        match self.store.get_language(user_id).await {
            Ok(Some(lang)) => lang,
            Ok(None) => DEFAULT_LANGUAGE.to_string(),
            Err(e) => {
                warn!("Error fetching language for user {}: {}", user_id, e);
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    /// Translate `text`, falling back to the original on any translation error.
    pub async fn translate_or_original(&self, text: &str, target_lang: &str) -> String {
        self.translator
            .translate(text, target_lang)
            .await
            .unwrap_or_else(|e| {
                warn!("Translation into {} failed, sending original: {}", target_lang, e);
                text.to_string()
            })
    }
}
