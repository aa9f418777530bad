//! Player configuration
//!
//! Loaded from an optional `vlone.toml` file, then overridden by environment
//! variables prefixed with `VLONE_` (nested keys separated by `__`, e.g.
//! `VLONE_PLAYBACK__HISTORY_SIZE=200`).

use crate::error::{Result, VloneError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "vlone.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Interval of the API health poll
    #[serde(default = "default_health_poll_secs")]
    pub health_poll_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    /// SQLite database backing the key-value store
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Chance that a track end injects a random catalog track
    #[serde(default = "default_smart_shuffle_probability")]
    pub smart_shuffle_probability: f64,

    /// Past this position, "previous" restarts the current track
    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,

    #[serde(default = "default_listening_tick_secs")]
    pub listening_tick_secs: u64,

    #[serde(default = "default_volume")]
    pub default_volume: f32,

    #[serde(default = "default_seek_step_secs")]
    pub seek_step_secs: f64,

    #[serde(default = "default_volume_step")]
    pub volume_step: f32,

    #[serde(default = "default_min_playback_rate")]
    pub min_playback_rate: f32,

    #[serde(default = "default_max_playback_rate")]
    pub max_playback_rate: f32,
}

impl PlayerConfig {
    /// Load configuration from `vlone.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load configuration from the given file (if present) and environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = config::Config::builder();

        if path.exists() {
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("VLONE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = &self.catalog.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(VloneError::Config(format!(
                "catalog.base_url must start with http:// or https:// (got {:?})",
                base_url
            )));
        }

        if self.catalog.timeout_secs == 0 {
            return Err(VloneError::Config(
                "catalog.timeout_secs must be positive".to_string(),
            ));
        }

        let playback = &self.playback;
        if playback.history_size == 0 {
            return Err(VloneError::Config(
                "playback.history_size must be positive".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&playback.smart_shuffle_probability) {
            return Err(VloneError::Config(format!(
                "playback.smart_shuffle_probability must be within [0, 1] (got {})",
                playback.smart_shuffle_probability
            )));
        }

        if !(0.0..=1.0).contains(&playback.default_volume) {
            return Err(VloneError::Config(format!(
                "playback.default_volume must be within [0, 1] (got {})",
                playback.default_volume
            )));
        }

        if playback.restart_threshold_secs < 0.0 || playback.seek_step_secs <= 0.0 {
            return Err(VloneError::Config(
                "playback.restart_threshold_secs must be >= 0 and seek_step_secs > 0".to_string(),
            ));
        }

        if playback.listening_tick_secs == 0 {
            return Err(VloneError::Config(
                "playback.listening_tick_secs must be positive".to_string(),
            ));
        }

        if playback.min_playback_rate <= 0.0
            || playback.min_playback_rate > playback.max_playback_rate
        {
            return Err(VloneError::Config(format!(
                "invalid playback rate range [{}, {}]",
                playback.min_playback_rate, playback.max_playback_rate
            )));
        }

        Ok(())
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            health_poll_secs: default_health_poll_secs(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            smart_shuffle_probability: default_smart_shuffle_probability(),
            restart_threshold_secs: default_restart_threshold_secs(),
            listening_tick_secs: default_listening_tick_secs(),
            default_volume: default_volume(),
            seek_step_secs: default_seek_step_secs(),
            volume_step: default_volume_step(),
            min_playback_rate: default_min_playback_rate(),
            max_playback_rate: default_max_playback_rate(),
        }
    }
}

// Default values
fn default_base_url() -> String {
    "https://juicewrldapi.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_health_poll_secs() -> u64 {
    30
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/vlone.db")
}

fn default_history_size() -> usize {
    100
}

fn default_smart_shuffle_probability() -> f64 {
    0.3
}

fn default_restart_threshold_secs() -> f64 {
    3.0
}

fn default_listening_tick_secs() -> u64 {
    1
}

fn default_volume() -> f32 {
    0.7
}

fn default_seek_step_secs() -> f64 {
    10.0
}

fn default_volume_step() -> f32 {
    0.1
}

fn default_min_playback_rate() -> f32 {
    0.5
}

fn default_max_playback_rate() -> f32 {
    2.0
}
