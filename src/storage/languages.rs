use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tracing::debug;

use super::{LanguageStore, SqliteStore};
use crate::error::StoreError;

#[async_trait]
impl LanguageStore for SqliteStore {
    async fn get_language(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        let language: Option<Option<String>> = conn
            .query_row(
                "SELECT language FROM users WHERE id = ?1",
                rusqlite::params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        // A row with a NULL language counts as no preference.
        let language = language.flatten();
        debug!("Language for user {}: {:?}", user_id, language);
        Ok(language)
    }

    async fn set_language(&self, user_id: &str, language: &str) -> Result<(), StoreError> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;

        conn.execute(
            "INSERT INTO users (id, language) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET language = excluded.language",
            rusqlite::params![user_id, language],
        )?;

        debug!("Language for user {} set to {}", user_id, language);
        Ok(())
    }
}
