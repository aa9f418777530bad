//! Keyboard and media-key bindings
//!
//! Bindings resolve to the same [`PlayerCommand`]s the views send, so there is
//! exactly one path into the player loop.

use crate::controller::PlayerCommand;
use crate::types::PlaybackConfig;
use serde::{Deserialize, Serialize};

/// A bound key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shortcut {
    /// Space
    TogglePlay,
    /// Left arrow
    SeekBackward,
    /// Right arrow
    SeekForward,
    /// Shift + Left arrow
    Previous,
    /// Shift + Right arrow
    Next,
    /// Up arrow
    VolumeUp,
    /// Down arrow
    VolumeDown,
    /// M
    ToggleMute,
    /// OS media keys
    MediaPlay,
    MediaPause,
    MediaPlayPause,
    MediaNext,
    MediaPrevious,
}

impl Shortcut {
    /// Parse a key name (DOM `KeyboardEvent.key` spelling)
    pub fn from_key(key: &str, shift: bool) -> Option<Self> {
        let shortcut = match key {
            " " | "Space" | "Spacebar" => Self::TogglePlay,
            "ArrowLeft" if shift => Self::Previous,
            "ArrowLeft" => Self::SeekBackward,
            "ArrowRight" if shift => Self::Next,
            "ArrowRight" => Self::SeekForward,
            "ArrowUp" => Self::VolumeUp,
            "ArrowDown" => Self::VolumeDown,
            "m" | "M" => Self::ToggleMute,
            "MediaPlay" => Self::MediaPlay,
            "MediaPause" => Self::MediaPause,
            "MediaPlayPause" => Self::MediaPlayPause,
            "MediaTrackNext" => Self::MediaNext,
            "MediaTrackPrevious" => Self::MediaPrevious,
            _ => return None,
        };
        Some(shortcut)
    }

    /// Command this binding dispatches
    pub fn command(self, config: &PlaybackConfig) -> PlayerCommand {
        match self {
            Self::TogglePlay | Self::MediaPlayPause => PlayerCommand::TogglePlay,
            Self::SeekBackward => PlayerCommand::SeekRelative(-config.seek_step_secs),
            Self::SeekForward => PlayerCommand::SeekRelative(config.seek_step_secs),
            Self::Previous | Self::MediaPrevious => PlayerCommand::Prev,
            Self::Next | Self::MediaNext => PlayerCommand::Next,
            Self::VolumeUp => PlayerCommand::AdjustVolume(config.volume_step),
            Self::VolumeDown => PlayerCommand::AdjustVolume(-config.volume_step),
            Self::ToggleMute => PlayerCommand::ToggleMute,
            Self::MediaPlay => PlayerCommand::Play,
            Self::MediaPause => PlayerCommand::Pause,
        }
    }
}
