use anyhow::{Context, Result};
use log::info;
use rusqlite::{OptionalExtension, params};

use super::connection::{self, DbPool};
use super::keys::StorageKey;
use super::local_store::LocalStore;
use super::setup;

/// Local store backed by a SQLite file
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (or create) the store at `path`
    pub fn open(path: &str) -> Result<Self> {
        let pool = connection::create_pool(path)?;
        let store = Self::from_pool(pool)?;
        info!("Opened local store at {}", path);
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_pool(connection::create_memory_pool()?)
    }

    fn from_pool(pool: DbPool) -> Result<Self> {
        let mut conn = connection::get_connection(&pool)?;
        setup::ensure_schema(&mut conn)?;
        drop(conn);
        Ok(Self { pool })
    }
}

impl LocalStore for SqliteStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        let conn = connection::get_connection(&self.pool)?;
        let sql = "SELECT value FROM local_store WHERE key = ?1";

        conn.query_row(sql, params![key.as_str()], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read {}", key))
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        let conn = connection::get_connection(&self.pool)?;
        let sql = "INSERT INTO local_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP) \
                   ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

        conn.execute(sql, params![key.as_str(), value])
            .with_context(|| format!("Failed to write {}", key))
            .map(|_| ())
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        let conn = connection::get_connection(&self.pool)?;
        let sql = "DELETE FROM local_store WHERE key = ?1";

        conn.execute(sql, params![key.as_str()])
            .with_context(|| format!("Failed to remove {}", key))
            .map(|_| ())
    }
}
