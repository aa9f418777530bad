//! SQLite backed key-value store

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use vlone_core::config::StorageSettings;
use vlone_core::KeyValueStore;

use crate::error::Result;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );
";

/// Key-value store persisted in a `settings` table
///
/// Values are stored as JSON text. Writes are single-row upserts, so the
/// per-second statistics flush touches one row instead of rewriting every
/// key.
#[derive(Debug)]
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file is
    /// not a usable SQLite database.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&path)?;
        info!(path = %path.display(), "Opened key-value store");
        Self::init(conn, Some(path))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    /// Open the store configured in the `storage` section
    pub fn from_settings(settings: &StorageSettings) -> Result<Self> {
        Self::open(&settings.path)
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let text = self
            .conn()
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }

    fn write(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        let now = chrono::Utc::now().timestamp();

        self.conn().execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, text, now],
        )?;

        debug!(key, "Stored value");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let removed = self
            .conn()
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;

        if removed > 0 {
            debug!(key, "Removed value");
        }
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get_value(&self, key: &str) -> vlone_core::Result<Option<serde_json::Value>> {
        match self.read(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set_value(&self, key: &str, value: serde_json::Value) -> vlone_core::Result<()> {
        self.write(key, &value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> vlone_core::Result<()> {
        self.delete(key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("vlone.db");

        let store = SqliteStore::open(&path).unwrap();
        store.set_value("player.volume", json!(0.4)).unwrap();
        store.set_value("player.mode", json!("radio")).unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get_value("player.volume").unwrap(), Some(json!(0.4)));
        assert_eq!(reopened.get_value("player.mode").unwrap(), Some(json!("radio")));
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let store = SqliteStore::open_in_memory().unwrap();

        for second in 0..5 {
            store.set_value("stats.listening", json!({ "seconds": second })).unwrap();
        }

        assert_eq!(
            store.get_value("stats.listening").unwrap(),
            Some(json!({ "seconds": 4 }))
        );
        let rows: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_remove_is_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vlone.db");

        let store = SqliteStore::open(&path).unwrap();
        store.set_value("stats.history", json!([])).unwrap();
        store.remove("stats.history").unwrap();
        store.remove("never-set").unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get_value("stats.history").unwrap(), None);
    }

    #[test]
    fn test_unparseable_value_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn()
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES ('broken', '{ not json', 0)",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.get_value("broken"),
            Err(vlone_core::VloneError::Serialization(_))
        ));
        assert_eq!(store.get_value("missing").unwrap(), None);
    }

    #[test]
    fn test_non_database_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vlone.db");
        fs::write(&path, "this is not a database, just some text padding it out").unwrap();

        assert!(matches!(
            SqliteStore::open(&path),
            Err(StorageError::Database(_))
        ));
    }

    #[test]
    fn test_from_settings_uses_configured_path() {
        let dir = TempDir::new().unwrap();
        let settings = StorageSettings {
            path: dir.path().join("data").join("vlone.db"),
        };

        let store = SqliteStore::from_settings(&settings).unwrap();
        store.set_value("k", json!(1)).unwrap();

        assert!(settings.path.exists());
        assert_eq!(store.path(), Some(settings.path.as_path()));
    }
}
