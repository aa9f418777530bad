//! History and statistics recorder
//!
//! Derived from track starts, never from time progress:
//! - History: bounded, deduplicated, most recent first
//! - Play-count ledger: one increment per playback start
//! - Listening clock: coarse wall-clock accumulator fed by a timer
//!
//! Everything is written through to the key-value store on change. Store
//! failures are logged and the in-memory values stay authoritative.
//!
//! Stored entries that no longer decode are skipped one by one. A stored
//! value that cannot be read at all is left untouched in the store until
//! [`StatsRecorder::wipe`].

use crate::history::History;
use crate::types::{KEY_HISTORY, KEY_LISTENING_TIME, KEY_PLAY_COUNTS};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use vlone_core::{KeyValueStore, KeyValueStoreExt, Track, TrackId};

/// Ledger entry: the last seen copy of a track and how often it started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayCount {
    pub track: Track,
    pub count: u64,
}

/// Mapping from track id to play count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayCountLedger {
    entries: HashMap<TrackId, PlayCount>,
}

impl PlayCountLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one playback start of `track`
    pub fn increment(&mut self, track: &Track) -> u64 {
        let entry = self
            .entries
            .entry(track.id.clone())
            .or_insert_with(|| PlayCount {
                track: track.clone(),
                count: 0,
            });
        entry.track = track.clone();
        entry.count += 1;
        entry.count
    }

    /// Play count for `id` (0 when never played)
    pub fn count(&self, id: &TrackId) -> u64 {
        self.entries.get(id).map_or(0, |entry| entry.count)
    }

    /// Entry for `id`
    pub fn get(&self, id: &TrackId) -> Option<&PlayCount> {
        self.entries.get(id)
    }

    /// The `n` most played entries, highest count first, ties broken by title
    pub fn top(&self, n: usize) -> Vec<&PlayCount> {
        let mut entries: Vec<&PlayCount> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.track.title.cmp(&b.track.title))
                .then_with(|| a.track.id.cmp(&b.track.id))
        });
        entries.truncate(n);
        entries
    }

    /// Number of distinct tracks ever started
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been played
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Total listening time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListeningClock {
    total_secs: f64,
}

impl ListeningClock {
    /// Clock starting at `total_secs`
    pub fn new(total_secs: f64) -> Self {
        Self {
            total_secs: total_secs.max(0.0),
        }
    }

    /// Add `secs` of listening
    pub fn add(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.total_secs += secs;
        }
    }

    /// Total seconds listened
    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    /// Whole minutes listened
    pub fn minutes(&self) -> u64 {
        (self.total_secs / 60.0).floor() as u64
    }

    /// Reset to zero
    pub fn reset(&mut self) {
        self.total_secs = 0.0;
    }
}

/// History, ledger and listening time, persisted through a key-value store
pub struct StatsRecorder {
    history: History,
    ledger: PlayCountLedger,
    clock: ListeningClock,
    store: Arc<dyn KeyValueStore>,
    /// Keys whose stored value could not be read; never overwritten
    protected: HashSet<&'static str>,
}

impl StatsRecorder {
    /// Load persisted statistics
    ///
    /// Missing keys start empty. Entries that fail to decode are skipped;
    /// keys that cannot be read at all start empty and are not written back
    /// until [`wipe`](Self::wipe).
    pub fn load(store: Arc<dyn KeyValueStore>, history_size: usize) -> Self {
        let mut protected = HashSet::new();

        let history = match store.get_entries::<Track>(KEY_HISTORY) {
            Ok(entries) => {
                report_skipped(KEY_HISTORY, entries.skipped);
                entries.items
            }
            Err(e) => {
                protect(&mut protected, KEY_HISTORY, &e);
                Vec::new()
            }
        };
        let history = History::from_tracks(history, history_size);

        let ledger = match load_ledger(store.as_ref()) {
            Ok((ledger, skipped)) => {
                report_skipped(KEY_PLAY_COUNTS, skipped);
                ledger
            }
            Err(e) => {
                protect(&mut protected, KEY_PLAY_COUNTS, &e);
                PlayCountLedger::new()
            }
        };

        let clock = match store.get::<ListeningClock>(KEY_LISTENING_TIME) {
            Ok(clock) => clock.unwrap_or_default(),
            Err(e) => {
                protect(&mut protected, KEY_LISTENING_TIME, &e);
                ListeningClock::default()
            }
        };

        debug!(
            history = history.len(),
            tracks_counted = ledger.len(),
            listening_secs = clock.total_secs(),
            "Loaded playback statistics"
        );

        Self {
            history,
            ledger,
            clock,
            store,
            protected,
        }
    }

    /// Record that `track` started playing
    pub fn record_start(&mut self, track: &Track) {
        self.history.push(track.clone());
        let count = self.ledger.increment(track);
        debug!(track_id = %track.id, count, "Recorded playback start");

        self.persist(KEY_HISTORY, &self.history.to_vec());
        self.persist(KEY_PLAY_COUNTS, &self.ledger);
    }

    /// Accumulate `secs` of listening time
    pub fn add_listening(&mut self, secs: f64) {
        self.clock.add(secs);
        self.persist(KEY_LISTENING_TIME, &self.clock);
    }

    /// Clear history, ledger and listening time, in memory and in the store
    pub fn wipe(&mut self) {
        self.history.clear();
        self.ledger.clear();
        self.clock.reset();
        self.protected.clear();

        for key in [KEY_HISTORY, KEY_PLAY_COUNTS, KEY_LISTENING_TIME] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove statistics key");
            }
        }
        debug!("Wiped playback statistics");
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn ledger(&self) -> &PlayCountLedger {
        &self.ledger
    }

    pub fn listening(&self) -> &ListeningClock {
        &self.clock
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if self.protected.contains(key) {
            debug!(key, "Stored statistics unreadable, not overwriting");
            return;
        }
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "Failed to persist statistics");
        }
    }
}

/// Decode the stored ledger entry by entry
fn load_ledger(store: &dyn KeyValueStore) -> vlone_core::Result<(PlayCountLedger, usize)> {
    let mut ledger = PlayCountLedger::new();
    let Some(value) = store.get_value(KEY_PLAY_COUNTS)? else {
        return Ok((ledger, 0));
    };

    let raw: HashMap<TrackId, serde_json::Value> = serde_json::from_value(value)?;
    let mut skipped = 0;
    for (id, entry) in raw {
        match serde_json::from_value::<PlayCount>(entry) {
            Ok(count) => {
                ledger.entries.insert(id, count);
            }
            Err(_) => skipped += 1,
        }
    }
    Ok((ledger, skipped))
}

fn report_skipped(key: &str, skipped: usize) {
    if skipped > 0 {
        warn!(key, skipped, "Skipped undecodable statistics entries");
    }
}

fn protect(
    protected: &mut HashSet<&'static str>,
    key: &'static str,
    error: &vlone_core::VloneError,
) {
    warn!(key, error = %error, "Unreadable statistics, stored value left untouched");
    protected.insert(key);
}

impl std::fmt::Debug for StatsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsRecorder")
            .field("history", &self.history.len())
            .field("ledger", &self.ledger.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
