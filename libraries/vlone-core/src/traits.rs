/// Collaborator traits for Vlone Player
use crate::error::Result;
use crate::types::{Track, TrackId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Search filters accepted by the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text title search
    pub search: Option<String>,

    /// Category slug
    pub category: Option<String>,

    /// Era name
    pub era: Option<String>,

    /// Producer (matched against every credited field)
    pub producer: Option<String>,

    /// 1-based result page
    pub page: Option<u32>,
}

impl SearchQuery {
    /// Plain text search on the first page
    pub fn text(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Tracks on this page
    pub items: Vec<Track>,

    /// Total matches across all pages
    pub total: u64,
}

/// Remote track catalog
///
/// Resolves track ids and queries to `Track` metadata with streamable
/// locators. Implementations map unknown ids to
/// [`VloneError::TrackNotFound`](crate::VloneError::TrackNotFound) and
/// network/server failures to
/// [`VloneError::Unavailable`](crate::VloneError::Unavailable).
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch a single track by id
    async fn fetch_track(&self, id: &TrackId) -> Result<Track>;

    /// Fetch one random track (radio / smart-shuffle injection)
    async fn fetch_random_track(&self) -> Result<Track>;

    /// Search the catalog (view layer only, the engine never searches)
    async fn search_tracks(&self, query: &SearchQuery) -> Result<SearchPage>;
}

/// Durable per-key storage surviving reloads
///
/// Synchronous from the caller's point of view. Values are JSON documents so
/// that any `serde` type can be persisted; see [`KeyValueStoreExt`] for typed
/// access.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key` (`None` when missing)
    fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write `value` under `key`
    fn set_value(&self, key: &str, value: serde_json::Value) -> Result<()>;

    /// Delete `key` (missing keys are not an error)
    fn remove(&self, key: &str) -> Result<()>;
}

/// Elements of a stored JSON array, decoded one at a time
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<T> {
    /// Elements that decoded, in stored order
    pub items: Vec<T>,

    /// Number of elements that did not decode
    pub skipped: usize,
}

impl<T> Entries<T> {
    /// Whether every stored element decoded
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

/// Typed helpers over [`KeyValueStore`]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and decode `key`
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be read or the stored value has another
    /// shape than `T`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_value(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Read and decode `key`, falling back to `default` when the key is
    /// missing, unreadable or holds a value of another shape
    ///
    /// Only for values that are safe to overwrite afterwards (preferences).
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).ok().flatten().unwrap_or(default)
    }

    /// Read the JSON array under `key`, decoding each element on its own
    ///
    /// A missing key gives no entries.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be read or the value is not an array.
    fn get_entries<T: DeserializeOwned>(&self, key: &str) -> Result<Entries<T>> {
        let Some(value) = self.get_value(key)? else {
            return Ok(Entries::default());
        };

        let raw: Vec<serde_json::Value> = serde_json::from_value(value)?;
        let mut entries = Entries {
            items: Vec::with_capacity(raw.len()),
            skipped: 0,
        };
        for element in raw {
            match serde_json::from_value(element) {
                Ok(item) => entries.items.push(item),
                Err(_) => entries.skipped += 1,
            }
        }
        Ok(entries)
    }

    /// Encode and write `value` under `key`
    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
