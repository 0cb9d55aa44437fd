pub mod languages;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::StoreError;

/// Language preferred by users with no stored preference.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Per-user language preference. `Ok(None)` means the user never set one.
#[async_trait]
pub trait LanguageStore: Send + Sync {
    async fn get_language(&self, user_id: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite; a repeated call for the same user never conflicts.
    async fn set_language(&self, user_id: &str, language: &str) -> Result<(), StoreError>;
}

/// SQLite-backed preference store. All access is serialized through one connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Open or create the SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // journal_mode PRAGMA always returns the resulting mode, so use query_row
        let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        Self::run_migrations(&conn)?;

        info!("Preference store initialized at: {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    fn run_migrations(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                language TEXT
            );
            ",
        )
        .context("Failed to create users table")?;

        // A pre-existing table with a different layout is left alone, only reported.
        let has_id_column = {
            let mut stmt = conn
                .prepare("PRAGMA table_info(users)")
                .context("Failed to query table structure")?;
            let columns = stmt
                .query_map([], |row| row.get::<_, String>(1))
                .context("Failed to read table structure")?
                .collect::<rusqlite::Result<Vec<_>>>()
                .context("Failed to scan table structure row")?;
            columns.iter().any(|name| name == "id")
        };

        if !has_id_column {
            warn!("'id' column is missing in the users table; check the database schema");
        }

        Ok(())
    }

    /// Close the underlying connection. Later lookups fail with `StoreError::Closed`.
    pub async fn close(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        match conn {
            Some(conn) => {
                conn.close()
                    .map_err(|(_, e)| e)
                    .context("Failed to close database")?;
                info!("Preference store closed");
            }
            None => warn!("Preference store already closed"),
        }
        Ok(())
    }
}
