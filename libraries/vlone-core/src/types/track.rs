/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Artist shown for tracks synthesized from a raw archive path
pub const LOCAL_EXPLORER_ARTIST: &str = "Local Explorer";

/// A playable item: metadata plus stream locators
///
/// Tracks are read-only once placed in a queue. The same logical track may
/// appear at several queue positions, so queue operations never rely on
/// track identity for positioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier (unique within a session)
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Credited artist(s)
    pub artist: String,

    /// Album name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Era the recording belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,

    /// Duration in seconds, 0 until known
    #[serde(default)]
    pub duration_secs: f64,

    /// Primary stream locator
    pub media_url: String,

    /// Alternate stream locator (video variant)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_media_url: Option<String>,

    /// Cover art locator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,

    /// Producer credits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,

    /// Path inside the source archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Alternate titles and tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Track {
    /// Create a track with the required fields only
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            era: None,
            duration_secs: 0.0,
            media_url: media_url.into(),
            secondary_media_url: None,
            cover_url: None,
            producer: None,
            file_path: None,
            tags: Vec::new(),
        }
    }

    /// Synthesize a track for a raw archive path
    ///
    /// The id is `file-<path>` so replaying the same path toggles rather than
    /// re-queues it.
    pub fn from_file_path(
        path: impl Into<String>,
        name: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let mut track = Self::new(
            format!("file-{}", path),
            name,
            LOCAL_EXPLORER_ARTIST,
            media_url,
        );
        track.file_path = Some(path);
        track
    }

    /// Set the duration (seconds)
    #[must_use]
    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = duration_secs.max(0.0);
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Whether the track carries a video variant
    pub fn has_video(&self) -> bool {
        self.secondary_media_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_track_from_path() {
        let track = Track::from_file_path(
            "Session Edits/demo.mp3",
            "demo",
            "https://example.com/stream?path=demo",
        );

        assert_eq!(track.id.as_str(), "file-Session Edits/demo.mp3");
        assert_eq!(track.artist, LOCAL_EXPLORER_ARTIST);
        assert_eq!(track.duration_secs, 0.0);
        assert_eq!(track.file_path.as_deref(), Some("Session Edits/demo.mp3"));
    }

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let track = Track::new("1", "Title", "Artist", "https://x/1.mp3");
        let json = serde_json::to_value(&track).unwrap();

        assert!(json.get("album").is_none());
        assert!(json.get("tags").is_none());
        assert_eq!(json["duration_secs"], 0.0);
    }

    #[test]
    fn negative_duration_is_clamped() {
        let track = Track::new("1", "Title", "Artist", "u").with_duration(-4.0);
        assert_eq!(track.duration_secs, 0.0);
    }
}
