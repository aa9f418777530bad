//! Vlone Player Core
//!
//! Platform-agnostic core types, collaborator traits, configuration and error
//! handling shared by every Vlone Player library.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `TrackId`, `PlaylistId`
//! - **Collaborator Traits**: `CatalogClient` (remote track catalog) and
//!   `KeyValueStore` (durable per-key storage)
//! - **Configuration**: `PlayerConfig`, layered from `vlone.toml` and `VLONE_*`
//! - **Error Handling**: Unified `VloneError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use vlone_core::types::{Playlist, Track};
//!
//! let track = Track::new("1042", "Lucid Dreams", "Juice WRLD", "https://cdn.example/1042.mp3");
//! let mut playlist = Playlist::new("Late nights");
//! playlist.add_track(track.id.clone());
//!
//! assert_eq!(playlist.track_ids.len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::PlayerConfig;
pub use error::{Result, VloneError};
pub use traits::{
    CatalogClient, Entries, KeyValueStore, KeyValueStoreExt, SearchPage, SearchQuery,
};
pub use types::{Playlist, PlaylistId, Track, TrackId};
