use thiserror::Error;

/// Failure reading or writing user preferences.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store is closed")]
    Closed,
}

/// Failure fetching or decoding the change feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status code: {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure translating text.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("unsupported target language: {0:?}")]
    UnsupportedLanguage(String),

    #[error("translation request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("translation service returned {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed translation response: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "unexpected status code: 503 Service Unavailable");
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = FetchError::from(json_err);
        assert!(err.to_string().starts_with("failed to parse JSON response"));
    }

    #[test]
    fn test_unsupported_language_display() {
        let err = TranslateError::UnsupportedLanguage("xx yy".into());
        assert_eq!(err.to_string(), "unsupported target language: \"xx yy\"");
    }
}
