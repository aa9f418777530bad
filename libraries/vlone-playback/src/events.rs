//! Playback Events
//!
//! Event-based communication for view synchronization. Events are emitted at
//! key points:
//! - Transport changes (playing/paused)
//! - Track changes (user intent, auto-advance, radio, injection)
//! - Queue and mode changes
//! - Fetch start and failure

use crate::types::{FetchPurpose, PlaybackMode};
use serde::{Deserialize, Serialize};
use vlone_core::TrackId;

/// Events emitted by the playback system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Transport intent changed
    StateChanged {
        /// Whether playback is now intended to run
        is_playing: bool,
    },

    /// A new track started (not emitted for restarts)
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Track finished playing naturally (reached end)
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Position update reported by the sink
    PositionUpdate {
        /// Current playback position
        position_secs: f64,
        /// Total track duration
        duration_secs: f64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Playback rate changed
    RateChanged {
        /// New rate multiplier
        rate: f32,
    },

    /// Playback mode changed
    ModeChanged {
        /// The new mode
        mode: PlaybackMode,
    },

    /// Queue changed (installed, reordered, removed, cleared, injected)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// A catalog fetch started
    Loading {
        /// Why the fetch was issued
        purpose: FetchPurpose,
    },

    /// Error occurred during playback (recovered locally)
    Error {
        /// Error message
        message: String,
    },
}

impl PlaybackEvent {
    /// Whether the event changes what is playing
    pub fn is_track_change(&self) -> bool {
        matches!(self, Self::TrackChanged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_change_detection() {
        let event = PlaybackEvent::TrackChanged {
            track_id: TrackId::new("2"),
            previous_track_id: Some(TrackId::new("1")),
        };
        assert!(event.is_track_change());
        assert!(!PlaybackEvent::QueueChanged { length: 3 }.is_track_change());
    }

    #[test]
    fn event_serializes() {
        let event = PlaybackEvent::ModeChanged {
            mode: PlaybackMode::SmartShuffle,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"ModeChanged":{"mode":"smart-shuffle"}}"#);

        let back: PlaybackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
