//! Playback history tracking
//!
//! Maintains a bounded, most-recent-first list of played tracks

use std::collections::VecDeque;
use vlone_core::Track;

/// Playback history with bounded size
///
/// Replaying a track moves it to the front instead of duplicating it. The
/// oldest entries are discarded once `max_size` is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    /// History buffer (most recent = front)
    tracks: VecDeque<Track>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Rebuild history from a persisted list (most recent first)
    pub fn from_tracks(tracks: Vec<Track>, max_size: usize) -> Self {
        let mut history = Self::new(max_size);
        for track in tracks.into_iter().rev() {
            history.push(track);
        }
        history
    }

    /// Record a playback start
    ///
    /// An existing entry with the same id is removed first
    pub fn push(&mut self, track: Track) {
        self.tracks.retain(|existing| existing.id != track.id);
        self.tracks.push_front(track);
        self.tracks.truncate(self.max_size);
    }

    /// Most recently started track
    pub fn most_recent(&self) -> Option<&Track> {
        self.tracks.front()
    }

    /// All history tracks (most recent first)
    pub fn to_vec(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }

    /// Iterate history tracks (most recent first)
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Get number of tracks in history
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}
