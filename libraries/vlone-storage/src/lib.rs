//! Vlone Player Storage
//!
//! Durable storage for Vlone Player: the key-value stores behind
//! `vlone_core::KeyValueStore`, and the playlist collection persisted on
//! top of them.
//!
//! # Architecture
//!
//! - **Key-Value**: JSON values keyed by string (`player.volume`,
//!   `stats.history`, ...), in memory or in a SQLite `settings` table
//! - **Vertical Slicing**: each feature owns its keys and logic
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vlone_storage::{MemoryStore, PlaylistStore};
//!
//! let playlists = PlaylistStore::new(Arc::new(MemoryStore::new()));
//! let mix = playlists.create("Late nights").unwrap();
//! playlists.add_track(&mix.id, "1042".into()).unwrap();
//!
//! assert_eq!(playlists.get(&mix.id).unwrap().track_ids.len(), 1);
//! ```

mod error;

// Vertical slices
pub mod playlists;
pub mod settings;

pub use error::{Result, StorageError};
pub use playlists::{PlaylistStore, KEY_PLAYLISTS};
pub use settings::{MemoryStore, SqliteStore};
