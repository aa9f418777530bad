/// Playlist domain types
use crate::types::{PlaylistId, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User playlist
///
/// Membership references tracks by id only; tracks are resolved against the
/// catalog when displayed or played. `track_ids` order is insertion order
/// and defines "play all" order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Optional free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Member track ids, in playback order
    #[serde(default)]
    pub track_ids: Vec<TrackId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Playlist {
    /// Create a new empty playlist with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::generate(),
            name: name.into(),
            description: None,
            track_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether the playlist already references the track
    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.track_ids.contains(track_id)
    }

    /// Append a track if absent
    ///
    /// Returns `false` when the track was already a member.
    pub fn add_track(&mut self, track_id: TrackId) -> bool {
        if self.contains(&track_id) {
            return false;
        }
        self.track_ids.push(track_id);
        true
    }

    /// Remove every reference to a track
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_track(&mut self, track_id: &TrackId) -> bool {
        let before = self.track_ids.len();
        self.track_ids.retain(|id| id != track_id);
        self.track_ids.len() != before
    }
}
