use super::SettingsStore;
use crate::utils::paths::{ensure_directories_exist, get_database_path};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Key-value settings persisted in a single SQLite table.
pub struct SqliteSettings {
    conn: Connection,
}

impl SqliteSettings {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {path:?}"))?;
        // A running session and a one-shot command may share the file.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let settings = Self { conn };
        settings.init()?;
        Ok(settings)
    }

    pub fn open_default() -> Result<Self> {
        ensure_directories_exist()?;
        let path = get_database_path()?;
        Self::open(&path)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let settings = Self { conn };
        settings.init()?;
        Ok(settings)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl SettingsStore for SqliteSettings {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read setting '{key}'"))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .with_context(|| format!("Failed to write setting '{key}'"))?;
        Ok(())
    }
}
