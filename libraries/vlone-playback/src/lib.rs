//! Vlone Player - Playback Management
//!
//! The queue and playback state machine of Vlone Player.
//!
//! This crate provides:
//! - Positional play queue with a retained original (pre-shuffle) order
//! - Playback modes: Normal, Shuffle, SmartShuffle (random catalog
//!   injections) and Radio (endless random catalog tracks)
//! - Volume (linear 0.0-1.0, mute/unmute), playback rate and seeking
//! - History, play counts and listening time, persisted through a
//!   key-value store
//! - A single-writer async loop (`PlayerService`) with a cloneable handle,
//!   snapshot subscription and event stream
//! - Keyboard and media-key bindings
//!
//! # Architecture
//!
//! `vlone-playback` never renders audio and never talks HTTP itself:
//! - Rendering goes through the [`MediaSink`] trait
//! - Catalog lookups go through `vlone_core::CatalogClient`
//! - Persistence goes through `vlone_core::KeyValueStore`
//!
//! [`PlaybackManager`] is fully synchronous. Where a catalog fetch is needed
//! it returns a [`FetchRequest`] and waits for [`PlaybackManager::complete_fetch`].
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use std::sync::Arc;
//! use vlone_core::Track;
//! use vlone_playback::{NullSink, PlaybackConfig, PlaybackManager};
//! use vlone_storage::MemoryStore;
//!
//! let mut manager = PlaybackManager::new(
//!     PlaybackConfig::default(),
//!     Box::new(NullSink),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! let queue = vec![
//!     Track::new("1", "Lucid Dreams", "Juice WRLD", "https://cdn.example/1.mp3"),
//!     Track::new("2", "Robbery", "Juice WRLD", "https://cdn.example/2.mp3"),
//! ];
//! manager.play_track(queue[0].clone(), Some(queue));
//! assert!(manager.is_playing());
//!
//! manager.next();
//! assert_eq!(manager.current_index(), Some(1));
//!
//! // Wraps back to the start
//! manager.next();
//! assert_eq!(manager.current_index(), Some(0));
//! ```
//!
//! # Example: Radio
//!
//! ```rust
//! use std::sync::Arc;
//! use vlone_core::Track;
//! use vlone_playback::{FetchPurpose, NullSink, PlaybackConfig, PlaybackManager, PlaybackMode};
//! use vlone_storage::MemoryStore;
//!
//! let mut manager = PlaybackManager::new(
//!     PlaybackConfig::default(),
//!     Box::new(NullSink),
//!     Arc::new(MemoryStore::new()),
//! );
//!
//! // Entering radio asks for a random catalog track
//! let request = manager.set_mode(PlaybackMode::Radio).unwrap();
//! assert_eq!(request.purpose, FetchPurpose::Radio);
//!
//! // ... fetch it, then hand it back
//! let track = Track::new("77", "Righteous", "Juice WRLD", "https://cdn.example/77.mp3");
//! manager.complete_fetch(request.ticket, Ok(track));
//! assert_eq!(manager.current_track().unwrap().title, "Righteous");
//! ```

mod controller;
mod error;
pub mod events;
mod history;
mod manager;
mod queue;
mod shortcuts;
mod shuffle;
mod sink;
pub mod stats;
pub mod types;
mod volume;

// Public exports
pub use controller::{resolve_tracks, PlayerCommand, PlayerHandle, PlayerService};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use history::History;
pub use manager::PlaybackManager;
pub use queue::Queue;
pub use shortcuts::Shortcut;
pub use sink::{ChannelSink, MediaSink, NullSink, SinkCommand, SinkEvent};
pub use stats::{ListeningClock, PlayCount, PlayCountLedger, StatsRecorder};
pub use types::{
    FetchPurpose, FetchRequest, FetchTicket, PlaybackConfig, PlaybackMode, PlaybackSnapshot,
};
pub use volume::Volume;
