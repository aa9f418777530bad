//! Media sink contract
//!
//! Abstracts the single-element renderer that plays one track at a time
//! (an audio/video element, a native player, a test double). The manager
//! drives it with transport commands and consumes its events.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

/// Renderer driven by the playback manager
///
/// Commands are fire-and-forget. A renderer that fails reports it through its
/// own events (e.g. never sending `Play`); the manager never blocks on it.
pub trait MediaSink: Send {
    /// Replace the current media with `media_url`, starting at position 0
    fn load(&mut self, media_url: &str);

    /// Start or resume rendering
    fn play(&mut self);

    /// Pause rendering
    fn pause(&mut self);

    /// Jump to `position_secs`
    fn seek(&mut self, position_secs: f64);

    /// Set output level (0.0-1.0, already mute-adjusted)
    fn set_volume(&mut self, level: f32);

    /// Set playback rate multiplier
    fn set_playback_rate(&mut self, rate: f32);
}

/// Events reported by a media sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SinkEvent {
    /// Playback position advanced
    TimeUpdate(f64),

    /// Media duration became known or changed
    DurationChange(f64),

    /// Media reached its end (sole auto-advance trigger)
    Ended,

    /// Renderer started playing (possibly outside engine control)
    Play,

    /// Renderer paused (possibly outside engine control)
    Pause,
}

/// A recorded sink command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SinkCommand {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
    SetPlaybackRate(f32),
}

/// Sink that ignores every command
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MediaSink for NullSink {
    fn load(&mut self, _media_url: &str) {}
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _position_secs: f64) {}
    fn set_volume(&mut self, _level: f32) {}
    fn set_playback_rate(&mut self, _rate: f32) {}
}

/// Sink forwarding every command over a channel
///
/// Lets a renderer living on another task (or a test) observe what the
/// manager asked for, in order.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkCommand>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its command stream
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, command: SinkCommand) {
        if self.tx.send(command).is_err() {
            trace!("Sink receiver dropped, command discarded");
        }
    }
}

impl MediaSink for ChannelSink {
    fn load(&mut self, media_url: &str) {
        self.send(SinkCommand::Load(media_url.to_string()));
    }

    fn play(&mut self) {
        self.send(SinkCommand::Play);
    }

    fn pause(&mut self) {
        self.send(SinkCommand::Pause);
    }

    fn seek(&mut self, position_secs: f64) {
        self.send(SinkCommand::Seek(position_secs));
    }

    fn set_volume(&mut self, level: f32) {
        self.send(SinkCommand::SetVolume(level));
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.send(SinkCommand::SetPlaybackRate(rate));
    }
}
