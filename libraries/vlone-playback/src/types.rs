//! Core types for playback management

use serde::{Deserialize, Serialize};
use vlone_core::config::PlaybackSettings;
use vlone_core::{Track, TrackId};

/// Store key: volume level (0.0-1.0)
pub const KEY_VOLUME: &str = "player.volume";

/// Store key: playback mode
pub const KEY_MODE: &str = "player.mode";

/// Store key: playback rate
pub const KEY_PLAYBACK_RATE: &str = "player.playback_rate";

/// Store key: recently played tracks, most recent first
pub const KEY_HISTORY: &str = "stats.history";

/// Store key: play-count ledger
pub const KEY_PLAY_COUNTS: &str = "stats.most_played";

/// Store key: accumulated listening time (seconds)
pub const KEY_LISTENING_TIME: &str = "stats.listening_time";

/// Playback mode
///
/// Modes are mutually exclusive and decide what happens when a track ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackMode {
    /// Play the authored order, wrap at the end
    #[default]
    Normal,

    /// Play a random permutation of the authored order, wrap at the end
    Shuffle,

    /// Authored order with occasional random catalog tracks spliced in
    SmartShuffle,

    /// Ignore the queue, every track end fetches a fresh random track
    Radio,
}

/// Why a catalog fetch was requested, and what to fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchPurpose {
    /// Next radio track
    Radio,

    /// Smart-shuffle injection after the current position
    Injection,

    /// Single track requested by id, played once resolved
    ById(TrackId),

    /// Playlist ids, installed as a new queue once resolved
    Playlist(Vec<TrackId>),
}

impl FetchPurpose {
    /// Whether the fetch asks the catalog for a random track
    pub fn is_random(&self) -> bool {
        matches!(self, Self::Radio | Self::Injection)
    }
}

/// Identifies one in-flight fetch; completions carrying an older ticket are
/// discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket(pub u64);

/// A catalog fetch the owner of the manager must perform
///
/// Single-track results go back through
/// [`PlaybackManager::complete_fetch`](crate::PlaybackManager::complete_fetch),
/// resolved playlists through
/// [`PlaybackManager::complete_playlist`](crate::PlaybackManager::complete_playlist).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub purpose: FetchPurpose,
}

/// Point-in-time copy of the playback session, published to observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub current_time_secs: f64,
    pub duration_secs: f64,
    pub volume: f32,
    pub is_muted: bool,
    pub playback_rate: f32,
    pub mode: PlaybackMode,
    pub queue: Vec<Track>,
    pub current_index: Option<usize>,
    pub loading: Option<FetchPurpose>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            current_time_secs: 0.0,
            duration_secs: 0.0,
            volume: 0.7,
            is_muted: false,
            playback_rate: 1.0,
            mode: PlaybackMode::Normal,
            queue: Vec::new(),
            current_index: None,
            loading: None,
        }
    }
}

/// Configuration for playback manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 100)
    pub history_size: usize,

    /// Smart-shuffle injection chance per track end (default: 0.3)
    pub smart_shuffle_probability: f64,

    /// "Previous" restarts the track past this position (default: 3s)
    pub restart_threshold_secs: f64,

    /// Listening-time accumulator period (default: 1s)
    pub listening_tick_secs: u64,

    /// Volume used when nothing is persisted (default: 0.7)
    pub default_volume: f32,

    /// Relative seek step for shortcuts (default: 10s)
    pub seek_step_secs: f64,

    /// Volume step for shortcuts (default: 0.1)
    pub volume_step: f32,

    /// Slowest playback rate (default: 0.5)
    pub min_playback_rate: f32,

    /// Fastest playback rate (default: 2.0)
    pub max_playback_rate: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::from(&PlaybackSettings::default())
    }
}

impl From<&PlaybackSettings> for PlaybackConfig {
    fn from(settings: &PlaybackSettings) -> Self {
        Self {
            history_size: settings.history_size,
            smart_shuffle_probability: settings.smart_shuffle_probability,
            restart_threshold_secs: settings.restart_threshold_secs,
            listening_tick_secs: settings.listening_tick_secs,
            default_volume: settings.default_volume,
            seek_step_secs: settings.seek_step_secs,
            volume_step: settings.volume_step,
            min_playback_rate: settings.min_playback_rate,
            max_playback_rate: settings.max_playback_rate,
        }
    }
}
