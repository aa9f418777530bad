//! Vlone Player Catalog Client
//!
//! HTTP client library for the JSON track catalog API.
//!
//! # Features
//!
//! - **Playback**: `CatalogClient` implementation (lookup by id, radio)
//! - **Browse**: search, stats, eras, categories
//! - **Health**: background API status polling
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vlone_catalog::{CatalogConfig, HealthMonitor, HttpCatalogClient};
//! use vlone_core::{CatalogClient, PlayerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PlayerConfig::load()?;
//!     let client = HttpCatalogClient::new(CatalogConfig::from_settings(&config.catalog))?;
//!
//!     let health = HealthMonitor::spawn(client.clone());
//!     let catalog: Arc<dyn CatalogClient> = Arc::new(client);
//!
//!     let track = catalog.fetch_random_track().await?;
//!     println!("Radio: {} ({:?})", track.title, health.status().online);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod health;
mod types;

pub use client::HttpCatalogClient;
pub use error::{CatalogClientError, Result};
pub use health::{check_status, ApiStatus, HealthMonitor};
pub use types::{
    parse_length, ApiSong, ApiSongPage, CatalogConfig, CatalogStats, Category, Era, NamedField,
    OneOrMany, DEFAULT_ALBUM, DEFAULT_ARTIST,
};
