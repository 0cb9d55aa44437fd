use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::TranslateError;

/// Translates text into a target language; the source language is auto-detected.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError>;
}

/// Accepts `en`, `haw`, `zh-CN`, `pt-BR`, `sr-Latn` style codes.
pub fn is_valid_language_code(code: &str) -> bool {
    let mut parts = code.splitn(2, '-');
    let primary = parts.next().unwrap_or_default();
    if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    match parts.next() {
        None => true,
        Some(sub) => (2..=4).contains(&sub.len()) && sub.chars().all(|c| c.is_ascii_alphanumeric()),
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The body is `[[["<translated>", "<original>", ...], ...], ...]`; long input
/// is split into one segment per sentence.
pub fn parse_response(body: &Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Malformed("missing segment list".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        match segment.get(0) {
            Some(Value::String(s)) => translated.push_str(s),
            Some(Value::Null) => {}
            _ => {
                return Err(TranslateError::Malformed(format!(
                    "unexpected segment: {}",
                    segment
                )))
            }
        }
    }
    Ok(translated)
}

/// Client for the public Google Translate endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    config: TranslateConfig,
}

impl GoogleTranslator {
    pub fn new(config: TranslateConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        if !is_valid_language_code(target_lang) {
            return Err(TranslateError::UnsupportedLanguage(target_lang.to_string()));
        }

        let url = format!("{}/translate_a/single", self.config.base_url);
        debug!("Translating {} chars into {}", text.len(), target_lang);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(TranslateError::Transport)?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            return Err(TranslateError::UnsupportedLanguage(target_lang.to_string()));
        }
        if !status.is_success() {
            return Err(TranslateError::Status(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Malformed(e.to_string()))?;

        let translated = parse_response(&body)?;
        if translated.is_empty() && !text.is_empty() {
            return Err(TranslateError::Malformed("empty translation".to_string()));
        }
        Ok(translated)
    }
}
