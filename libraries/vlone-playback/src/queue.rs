//! Positional play queue
//!
//! The queue keeps two orders:
//! - Play order: what `next`/`prev` walk through (possibly shuffled, possibly
//!   holding injected tracks)
//! - Original order: the last order installed by an explicit "play with queue"
//!   action, used to undo a shuffle
//!
//! Identity inside the queue is positional. The same track may sit at several
//! positions, so reorder/remove work on indices, never on track ids.

use crate::error::{PlaybackError, Result};
use crate::shuffle::shuffle_tracks;
use rand::Rng;
use vlone_core::{Track, TrackId};

/// Play queue with a current position
///
/// Invariant: `current_index` is `Some(i)` with `i < tracks.len()` whenever
/// the queue is non-empty, and `None` when it is empty.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Play order
    tracks: Vec<Track>,

    /// Position of the now-playing entry
    current_index: Option<usize>,

    /// Order as installed by the user (pre-shuffle)
    original_order: Vec<Track>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new authored order
    ///
    /// Play order and original order both become `tracks`. The current
    /// position is set to `start` (clamped into range).
    pub fn install(&mut self, tracks: Vec<Track>, start: usize) {
        self.original_order.clone_from(&tracks);
        self.tracks = tracks;
        self.current_index = self.clamp_index(start);
    }

    /// Replace everything with a single track at index 0
    pub fn install_single(&mut self, track: Track) {
        self.install(vec![track], 0);
    }

    /// Replace the play order with a random permutation of the original order
    ///
    /// The current position follows `current` (see [`Queue::relocate`]).
    pub fn shuffle<R: Rng + ?Sized>(&mut self, current: Option<&Track>, rng: &mut R) {
        let mut tracks = self.original_order.clone();
        shuffle_tracks(&mut tracks, rng);
        self.tracks = tracks;
        self.relocate(current);
    }

    /// Restore the play order to the original order
    pub fn restore_original(&mut self, current: Option<&Track>) {
        self.tracks = self.original_order.clone();
        self.relocate(current);
    }

    /// Point the current position at `current` within the play order
    ///
    /// When `current` is not in the play order (e.g. an injected track that
    /// never was part of the authored order) the position is parked on the
    /// last entry, so the following advance starts at the head of the order.
    pub fn relocate(&mut self, current: Option<&Track>) {
        if self.tracks.is_empty() {
            self.current_index = None;
            return;
        }

        self.current_index = match current.and_then(|track| self.position_of(&track.id)) {
            Some(index) => Some(index),
            None => Some(self.tracks.len() - 1),
        };
    }

    /// First position holding a track with this id
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|track| &track.id == id)
    }

    /// Whether the play order contains a track with this id
    pub fn contains(&self, id: &TrackId) -> bool {
        self.position_of(id).is_some()
    }

    /// Move the current position to `index`
    pub fn select(&mut self, index: usize) -> Result<&Track> {
        let len = self.tracks.len();
        if index >= len {
            return Err(PlaybackError::IndexOutOfBounds { index, len });
        }

        self.current_index = Some(index);
        Ok(&self.tracks[index])
    }

    /// Step forward, wrapping from the last entry to the first
    pub fn advance(&mut self) -> Result<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return Err(PlaybackError::QueueEmpty);
        }

        let index = self.current_index.map_or(0, |i| (i + 1) % len);
        self.select(index)
    }

    /// Step backward, wrapping from the first entry to the last
    pub fn retreat(&mut self) -> Result<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return Err(PlaybackError::QueueEmpty);
        }

        let index = self.current_index.map_or(0, |i| (i + len - 1) % len);
        self.select(index)
    }

    /// Move the entry at `from` to `to` (remove-then-insert, not swap)
    ///
    /// The current position keeps pointing at the same entry.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tracks.len();
        if from >= len {
            return Err(PlaybackError::IndexOutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(PlaybackError::IndexOutOfBounds { index: to, len });
        }
        if from == to {
            return Ok(());
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);

        if let Some(current) = self.current_index {
            self.current_index = Some(if from == current {
                to
            } else if from < current && to >= current {
                current - 1
            } else if from > current && to <= current {
                current + 1
            } else {
                current
            });
        }

        Ok(())
    }

    /// Remove the entry at `index`
    ///
    /// The now-playing entry cannot be removed.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        let len = self.tracks.len();
        if index >= len {
            return Err(PlaybackError::IndexOutOfBounds { index, len });
        }
        if self.current_index == Some(index) {
            return Err(PlaybackError::RemoveCurrent(index));
        }

        let track = self.tracks.remove(index);
        if let Some(current) = self.current_index {
            if index < current {
                self.current_index = Some(current - 1);
            }
        }

        Ok(track)
    }

    /// Collapse the play order to just `current` at index 0
    ///
    /// With no current track the play order becomes empty. The original
    /// order is left alone.
    pub fn collapse_to(&mut self, current: Option<Track>) {
        match current {
            Some(track) => {
                self.tracks = vec![track];
                self.current_index = Some(0);
            }
            None => {
                self.tracks.clear();
                self.current_index = None;
            }
        }
    }

    /// Splice `track` in right after the current position
    ///
    /// Returns the position it landed at. The current position is unchanged.
    pub fn insert_after_current(&mut self, track: Track) -> usize {
        let position = self
            .current_index
            .map_or(self.tracks.len(), |index| index + 1);
        self.tracks.insert(position, track);

        if self.current_index.is_none() {
            self.current_index = Some(position);
        }

        position
    }

    /// Track at the current position
    pub fn current(&self) -> Option<&Track> {
        self.current_index.and_then(|index| self.tracks.get(index))
    }

    /// Current position
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Original (authored) order
    pub fn original_order(&self) -> &[Track] {
        &self.original_order
    }

    /// Number of entries in the play order
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the play order is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn clamp_index(&self, index: usize) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(index.min(self.tracks.len() - 1))
        }
    }
}
