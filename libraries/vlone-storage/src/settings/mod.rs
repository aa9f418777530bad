//! Key-value settings stores
//!
//! Player preferences and statistics are stored as key-value pairs with
//! JSON values, behind the `vlone_core::KeyValueStore` contract:
//!
//! - [`MemoryStore`]: process-local, for tests and ephemeral sessions
//! - [`SqliteStore`]: `settings` table in a SQLite database, survives restarts
//!
//! # Example
//!
//! ```rust
//! use vlone_core::KeyValueStoreExt;
//! use vlone_storage::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.set("player.volume", &0.4_f32).unwrap();
//!
//! assert_eq!(store.get_or("player.volume", 0.7_f32), 0.4);
//! assert_eq!(store.get_or("player.mode", "normal".to_string()), "normal");
//! ```

mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use vlone_core::KeyValueStore;

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_value(&self, key: &str) -> vlone_core::Result<Option<serde_json::Value>> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set_value(&self, key: &str, value: serde_json::Value) -> vlone_core::Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> vlone_core::Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
