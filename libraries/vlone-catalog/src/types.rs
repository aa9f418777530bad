//! Types for catalog API requests and responses.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vlone_core::config::CatalogSettings;
use vlone_core::Track;

/// Artist credited when the catalog leaves the field empty
pub const DEFAULT_ARTIST: &str = "Juice WRLD";

/// Album shown for tracks without an era
pub const DEFAULT_ALBUM: &str = "Unreleased";

const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".mov", ".mkv"];

/// Configuration for connecting to the catalog API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL without trailing slash (e.g., "https://juicewrldapi.com")
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Interval between API health checks
    pub health_poll_interval: Duration,
}

impl CatalogConfig {
    /// Create a config with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_settings(&CatalogSettings {
            base_url: base_url.into(),
            ..CatalogSettings::default()
        })
    }

    /// Build from the `catalog` configuration section.
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_secs),
            health_poll_interval: Duration::from_secs(settings.health_poll_secs),
        }
    }

    /// Stream locator for a raw archive path
    pub fn stream_url(&self, path: &str) -> String {
        self.locator("juicewrld/stream", path)
    }

    /// Download locator for a catalog file path
    pub fn download_url(&self, path: &str) -> String {
        self.locator("files/download/", path)
    }

    fn locator(&self, endpoint: &str, path: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("path", path)
            .finish();
        format!("{}/{}?{}", self.base_url, endpoint, query)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from_settings(&CatalogSettings::default())
    }
}

// =============================================================================
// Song Types
// =============================================================================

/// Free text, or an object carrying a `name`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NamedField {
    Text(String),
    Named { name: String },
}

impl NamedField {
    pub fn into_name(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Named { name } => name,
        }
    }
}

/// A single string or a list of strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Song as returned by the catalog API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSong {
    /// Numeric or string id
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub credited_artists: Option<String>,
    #[serde(default)]
    pub era: Option<NamedField>,
    /// Duration as `m:ss`
    #[serde(default)]
    pub length: Option<String>,
    /// Path inside the archive
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub producers: Option<String>,
    #[serde(default)]
    pub track_titles: Option<OneOrMany>,
}

impl ApiSong {
    /// Catalog id as a string, if present
    pub fn id_string(&self) -> Option<String> {
        let id = match self.id.as_ref()? {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!id.is_empty()).then_some(id)
    }

    /// Map to a playable `Track`
    ///
    /// Returns `None` when the song carries no usable id.
    pub fn into_track(self, config: &CatalogConfig) -> Option<Track> {
        let id = self.id_string()?;
        let path = non_empty(self.path).unwrap_or_default();

        let media_url = if path.is_empty() {
            String::new()
        } else {
            config.download_url(&path)
        };
        let is_video = VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext));
        let era = self.era.map(NamedField::into_name).and_then(|e| non_empty(Some(e)));

        let mut track = Track::new(
            id,
            non_empty(self.name).unwrap_or_else(|| "Unknown Title".to_string()),
            non_empty(self.credited_artists).unwrap_or_else(|| DEFAULT_ARTIST.to_string()),
            media_url.clone(),
        )
        .with_duration(parse_length(self.length.as_deref().unwrap_or_default()))
        .with_album(era.clone().unwrap_or_else(|| DEFAULT_ALBUM.to_string()));

        track.era = era;
        track.secondary_media_url = is_video.then_some(media_url);
        track.producer = non_empty(self.producers);
        track.file_path = (!path.is_empty()).then_some(path);
        track.tags = self.track_titles.map(OneOrMany::into_vec).unwrap_or_default();

        Some(track)
    }
}

/// Paginated song listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSongPage {
    #[serde(default)]
    pub results: Vec<ApiSong>,
    /// Total matches across all pages
    #[serde(default)]
    pub count: u64,
}

// =============================================================================
// Browse Types
// =============================================================================

/// Catalog-wide statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    #[serde(default)]
    pub total_songs: u64,
    /// Total duration in seconds
    #[serde(default)]
    pub total_duration: f64,
    #[serde(default)]
    pub categories_count: u64,
    #[serde(default)]
    pub eras_count: u64,
}

/// Recording era.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Era {
    pub name: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Song category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub count: u64,
    pub slug: String,
}

/// Parse an `m:ss` duration; anything else is 0
pub fn parse_length(length: &str) -> f64 {
    let mut parts = length.trim().split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(minutes), Some(seconds), None) => {
            match (minutes.trim().parse::<u64>(), seconds.trim().parse::<u64>()) {
                (Ok(m), Ok(s)) => (m * 60 + s) as f64,
                _ => 0.0,
            }
        }
        _ => 0.0,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> CatalogConfig {
        CatalogConfig::new("https://juicewrldapi.com/")
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("3:05"), 185.0);
        assert_eq!(parse_length("0:59"), 59.0);
        assert_eq!(parse_length(""), 0.0);
        assert_eq!(parse_length("1:02:03"), 0.0);
        assert_eq!(parse_length("abc"), 0.0);
    }

    #[test]
    fn test_config_normalizes_base_url() {
        let config = config();
        assert_eq!(config.base_url, "https://juicewrldapi.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.health_poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_stream_url_encodes_path() {
        assert_eq!(
            config().stream_url("Session Edits/a&b.mp3"),
            "https://juicewrldapi.com/juicewrld/stream?path=Session+Edits%2Fa%26b.mp3"
        );
    }

    #[test]
    fn test_full_song_mapping() {
        let song: ApiSong = serde_json::from_value(json!({
            "id": 1042,
            "name": "Lucid Dreams",
            "credited_artists": "Juice WRLD",
            "era": "Goodbye & Good Riddance",
            "length": "3:59",
            "path": "Released/lucid.mp3",
            "producers": "Nick Mira",
            "track_titles": ["Lucid Dreams", "Forget Me"]
        }))
        .unwrap();

        let track = song.into_track(&config()).unwrap();

        assert_eq!(track.id.as_str(), "1042");
        assert_eq!(track.title, "Lucid Dreams");
        assert_eq!(track.album.as_deref(), Some("Goodbye & Good Riddance"));
        assert_eq!(track.era.as_deref(), Some("Goodbye & Good Riddance"));
        assert_eq!(track.duration_secs, 239.0);
        assert_eq!(
            track.media_url,
            "https://juicewrldapi.com/files/download/?path=Released%2Flucid.mp3"
        );
        assert!(!track.has_video());
        assert_eq!(track.producer.as_deref(), Some("Nick Mira"));
        assert_eq!(track.file_path.as_deref(), Some("Released/lucid.mp3"));
        assert_eq!(track.tags, vec!["Lucid Dreams", "Forget Me"]);
    }

    #[test]
    fn test_sparse_song_gets_defaults() {
        let song: ApiSong = serde_json::from_value(json!({
            "id": "77",
            "credited_artists": "",
            "track_titles": "Alt"
        }))
        .unwrap();

        let track = song.into_track(&config()).unwrap();

        assert_eq!(track.title, "Unknown Title");
        assert_eq!(track.artist, DEFAULT_ARTIST);
        assert_eq!(track.album.as_deref(), Some(DEFAULT_ALBUM));
        assert_eq!(track.era, None);
        assert_eq!(track.duration_secs, 0.0);
        assert_eq!(track.media_url, "");
        assert_eq!(track.file_path, None);
        assert_eq!(track.tags, vec!["Alt"]);
    }

    #[test]
    fn test_video_sets_secondary_locator() {
        let song: ApiSong = serde_json::from_value(json!({
            "id": 5,
            "path": "Videos/clip.mp4",
            "era": {"name": "DRFL"}
        }))
        .unwrap();

        let track = song.into_track(&config()).unwrap();

        assert!(track.has_video());
        assert_eq!(track.secondary_media_url.as_deref(), Some(track.media_url.as_str()));
        assert_eq!(track.era.as_deref(), Some("DRFL"));
    }

    #[test]
    fn test_song_without_id_is_dropped() {
        let song: ApiSong = serde_json::from_value(json!({"name": "ghost"})).unwrap();
        assert!(song.into_track(&config()).is_none());

        let song: ApiSong = serde_json::from_value(json!({"id": null})).unwrap();
        assert!(song.id_string().is_none());
    }
}
