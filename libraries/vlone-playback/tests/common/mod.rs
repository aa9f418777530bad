//! Shared helpers for playback integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use vlone_core::{CatalogClient, KeyValueStore, SearchPage, SearchQuery, Track, TrackId, VloneError};
use vlone_playback::{NullSink, PlaybackConfig, PlaybackManager};
use vlone_storage::MemoryStore;

static INIT: Once = Once::new();

/// Route `tracing` output to the test writer (filter with `RUST_LOG`)
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn track(id: &str) -> Track {
    Track::new(id, format!("Track {id}"), "Juice WRLD", format!("https://cdn.test/{id}.mp3"))
        .with_duration(180.0)
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

pub fn ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.id.to_string()).collect()
}

pub fn current_id(manager: &PlaybackManager) -> Option<String> {
    manager.current_track().map(|t| t.id.to_string())
}

/// Manager with a silent sink, in-memory store and seeded RNG
pub fn manager_with(config: PlaybackConfig) -> PlaybackManager {
    init_tracing();
    PlaybackManager::new(config, Box::new(NullSink), Arc::new(MemoryStore::new()))
        .with_rng(StdRng::seed_from_u64(0x5EED))
}

pub fn manager() -> PlaybackManager {
    manager_with(PlaybackConfig::default())
}

/// Manager with `ids` installed as the queue, playing index `start`
pub fn playing(ids: &[&str], start: usize) -> PlaybackManager {
    let mut manager = manager();
    let queue = tracks(ids);
    manager.play_track(queue[start].clone(), Some(queue));
    manager
}

/// Store whose writes always fail (quota exceeded)
#[derive(Default)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get_value(&self, _key: &str) -> vlone_core::Result<Option<serde_json::Value>> {
        Ok(None)
    }

    fn set_value(&self, _key: &str, _value: serde_json::Value) -> vlone_core::Result<()> {
        Err(VloneError::storage("quota exceeded"))
    }

    fn remove(&self, _key: &str) -> vlone_core::Result<()> {
        Err(VloneError::storage("quota exceeded"))
    }
}

/// Catalog double with scripted random tracks and a fixed id lookup table
#[derive(Default)]
pub struct FakeCatalog {
    random: Mutex<VecDeque<vlone_core::Result<Track>>>,
    by_id: HashMap<TrackId, Track>,
    lookup_delay: Option<Duration>,
    random_calls: Mutex<usize>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next random fetch succeeds with `track`
    pub fn push_random(&self, track: Track) {
        self.random.lock().unwrap().push_back(Ok(track));
    }

    /// Next random fetch fails as unavailable
    pub fn push_random_failure(&self) {
        self.random
            .lock()
            .unwrap()
            .push_back(Err(VloneError::unavailable("connection refused")));
    }

    pub fn with_tracks(mut self, tracks: Vec<Track>) -> Self {
        for track in tracks {
            self.by_id.insert(track.id.clone(), track);
        }
        self
    }

    /// Every id lookup takes `delay` (tokio time)
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub fn random_calls(&self) -> usize {
        *self.random_calls.lock().unwrap()
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn fetch_track(&self, id: &TrackId) -> vlone_core::Result<Track> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| VloneError::TrackNotFound(id.clone()))
    }

    async fn fetch_random_track(&self) -> vlone_core::Result<Track> {
        *self.random_calls.lock().unwrap() += 1;
        self.random
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(VloneError::unavailable("no scripted track")))
    }

    async fn search_tracks(&self, _query: &SearchQuery) -> vlone_core::Result<SearchPage> {
        Ok(SearchPage::default())
    }
}
