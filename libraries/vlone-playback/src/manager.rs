//! Playback manager - core orchestration
//!
//! Owns the queue, transport intent, mode, volume and statistics, drives the
//! media sink and decides what plays next. Every operation is synchronous and
//! infallible from the caller's point of view: failures are logged, reported
//! as [`PlaybackEvent::Error`] where the listener cares, and state is left
//! consistent.
//!
//! Catalog fetches are not performed here. Operations that need one return a
//! [`FetchRequest`]; the owner performs the fetch and hands the outcome back
//! through [`PlaybackManager::complete_fetch`] (or
//! [`PlaybackManager::complete_playlist`]). Only the latest request is
//! honoured.

use crate::{
    error::PlaybackError,
    events::PlaybackEvent,
    history::History,
    queue::Queue,
    shuffle::should_inject,
    sink::{MediaSink, SinkEvent},
    stats::StatsRecorder,
    types::{
        FetchPurpose, FetchRequest, FetchTicket, PlaybackConfig, PlaybackMode, PlaybackSnapshot,
        KEY_MODE, KEY_PLAYBACK_RATE, KEY_VOLUME,
    },
    volume::Volume,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use vlone_core::{KeyValueStore, KeyValueStoreExt, Track, TrackId};

/// Playback manager
///
/// Single owner of the playback session state. Wrap it in a
/// [`PlayerService`](crate::PlayerService) to drive it from async code.
pub struct PlaybackManager {
    config: PlaybackConfig,

    // Session state
    queue: Queue,
    current_track: Option<Track>,
    is_playing: bool,
    current_time_secs: f64,
    duration_secs: f64,
    volume: Volume,
    playback_rate: f32,
    mode: PlaybackMode,

    // In-flight catalog fetch (at most one)
    pending_fetch: Option<FetchRequest>,
    last_ticket: u64,

    // History, play counts, listening time
    stats: StatsRecorder,

    // Collaborators
    sink: Box<dyn MediaSink>,
    store: Arc<dyn KeyValueStore>,
    rng: StdRng,

    // Event queue for view synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackManager {
    /// Create new playback manager
    ///
    /// Volume, mode and playback rate are restored from `store`; queue,
    /// current track and position always start empty.
    pub fn new(
        config: PlaybackConfig,
        sink: Box<dyn MediaSink>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let volume = Volume::new(store.get_or(KEY_VOLUME, config.default_volume));
        let mode = store.get_or(KEY_MODE, PlaybackMode::default());
        let playback_rate = store
            .get_or(KEY_PLAYBACK_RATE, 1.0_f32)
            .clamp(config.min_playback_rate, config.max_playback_rate);
        let stats = StatsRecorder::load(store.clone(), config.history_size);

        let mut manager = Self {
            config,
            queue: Queue::new(),
            current_track: None,
            is_playing: false,
            current_time_secs: 0.0,
            duration_secs: 0.0,
            volume,
            playback_rate,
            mode,
            pending_fetch: None,
            last_ticket: 0,
            stats,
            sink,
            store,
            rng: StdRng::from_entropy(),
            pending_events: Vec::new(),
        };

        manager.sink.set_volume(manager.volume.gain());
        manager.sink.set_playback_rate(manager.playback_rate);

        info!(
            mode = ?manager.mode,
            volume = manager.volume.level(),
            rate = manager.playback_rate,
            "Playback manager ready"
        );
        manager
    }

    /// Replace the random source (shuffle order, smart-shuffle coin flips)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Fetch to issue right after startup
    ///
    /// A session restored in radio mode starts by fetching a radio track.
    pub fn on_startup(&mut self) -> Option<FetchRequest> {
        if self.mode == PlaybackMode::Radio {
            Some(self.begin_fetch(FetchPurpose::Radio))
        } else {
            None
        }
    }

    // ===== Playback Control =====

    /// Play `track`, optionally installing `new_queue` as the new play order
    ///
    /// - Same track as the current one: toggles play/pause, nothing else
    /// - With a non-empty `new_queue`: installs it (shuffled in shuffle mode)
    ///   as the new original order; a `track` missing from it is put in front
    /// - Track not in the queue: the queue becomes just `[track]`
    /// - Otherwise: jumps to the track's position in the existing queue
    pub fn play_track(&mut self, track: Track, new_queue: Option<Vec<Track>>) {
        if self.current_track.as_ref().map(|t| &t.id) == Some(&track.id) {
            self.toggle_play();
            return;
        }

        self.cancel_fetch();

        match new_queue.filter(|tracks| !tracks.is_empty()) {
            Some(mut tracks) => {
                let position = match tracks.iter().position(|t| t.id == track.id) {
                    Some(position) => position,
                    None => {
                        warn!(track_id = %track.id, "Track not in new queue, putting it first");
                        tracks.insert(0, track.clone());
                        0
                    }
                };

                self.queue.install(tracks, position);
                if self.mode == PlaybackMode::Shuffle {
                    self.queue.shuffle(Some(&track), &mut self.rng);
                }
                debug!(track_id = %track.id, length = self.queue.len(), "Installed new queue");
                self.emit_queue_changed();
            }
            None => match self.queue.position_of(&track.id) {
                Some(position) => {
                    if let Err(e) = self.queue.select(position) {
                        warn!(error = %e, "Failed to select queued track");
                    }
                }
                None => {
                    self.queue.install_single(track.clone());
                    self.emit_queue_changed();
                }
            },
        }

        self.start_track(track);
    }

    /// Flip the transport intent
    pub fn toggle_play(&mut self) {
        self.set_playing(!self.is_playing);
    }

    /// Resume playback
    pub fn play(&mut self) {
        self.set_playing(true);
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    /// Skip to next track
    ///
    /// Wraps at the end of the queue. In radio mode the queue is ignored and
    /// a fresh radio track is requested instead.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<FetchRequest> {
        if self.mode == PlaybackMode::Radio {
            return Some(self.begin_fetch(FetchPurpose::Radio));
        }

        self.advance_queue();
        None
    }

    /// Go to previous track
    ///
    /// Past the restart threshold the current track restarts instead.
    pub fn prev(&mut self) {
        if self.queue.is_empty() {
            debug!("Previous ignored, queue is empty");
            return;
        }

        if self.current_time_secs > self.config.restart_threshold_secs {
            debug!(position = self.current_time_secs, "Restarting current track");
            self.current_time_secs = 0.0;
            self.sink.seek(0.0);
            return;
        }

        self.cancel_fetch();
        match self.queue.retreat() {
            Ok(track) => {
                let track = track.clone();
                self.start_track(track);
            }
            Err(e) => debug!(error = %e, "Previous ignored"),
        }
    }

    /// Feed an event reported by the media sink
    ///
    /// Returns a fetch to perform when the track end needs a catalog track.
    pub fn handle_sink_event(&mut self, event: SinkEvent) -> Option<FetchRequest> {
        match event {
            SinkEvent::TimeUpdate(position) => {
                self.current_time_secs = position.max(0.0);
                self.pending_events.push(PlaybackEvent::PositionUpdate {
                    position_secs: self.current_time_secs,
                    duration_secs: self.duration_secs,
                });
                None
            }
            SinkEvent::DurationChange(duration) => {
                if duration.is_finite() && duration >= 0.0 {
                    self.duration_secs = duration;
                }
                None
            }
            SinkEvent::Play => {
                self.sync_playing(true);
                None
            }
            SinkEvent::Pause => {
                self.sync_playing(false);
                None
            }
            SinkEvent::Ended => self.on_track_ended(),
        }
    }

    /// Deliver the outcome of a single-track fetch issued through a
    /// [`FetchRequest`]
    ///
    /// Outcomes for anything but the latest request are discarded.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: vlone_core::Result<Track>) {
        let Some(request) = self.take_pending(ticket) else {
            return;
        };

        match (request.purpose, result) {
            (FetchPurpose::Radio, Ok(track)) => {
                debug!(track_id = %track.id, "Radio track arrived");
                self.start_track(track);
            }
            (FetchPurpose::Radio, Err(e)) => {
                // Stalled: the ended track stays current, transport intent untouched
                warn!(error = %e, "Radio fetch failed");
                self.emit_error(format!("Radio fetch failed: {e}"));
            }
            (FetchPurpose::Injection, Ok(track)) => {
                let position = self.queue.insert_after_current(track);
                debug!(position, "Injected random track");
                self.emit_queue_changed();
                self.advance_queue();
            }
            (FetchPurpose::Injection, Err(e)) => {
                warn!(error = %e, "Injection fetch failed, advancing normally");
                self.advance_queue();
            }
            (FetchPurpose::ById(_), Ok(track)) => self.play_track(track, None),
            (FetchPurpose::ById(id), Err(e)) => {
                warn!(track_id = %id, error = %e, "Track lookup failed");
                self.emit_error(format!("Track lookup failed: {e}"));
            }
            (FetchPurpose::Playlist(_), _) => {
                warn!(ticket = ticket.0, "Playlist fetch completed as a single track, ignoring");
            }
        }
    }

    /// Deliver the tracks a playlist fetch resolved to, in playlist order
    ///
    /// The first track starts and the whole list becomes the new queue.
    /// Outcomes for anything but the latest request are discarded.
    pub fn complete_playlist(&mut self, ticket: FetchTicket, tracks: Vec<Track>) {
        let Some(request) = self.take_pending(ticket) else {
            return;
        };

        if !matches!(request.purpose, FetchPurpose::Playlist(_)) {
            warn!(
                ticket = ticket.0,
                purpose = ?request.purpose,
                "Track list for a single-track fetch, ignoring"
            );
            return;
        }

        match tracks.first() {
            Some(first) => {
                let first = first.clone();
                self.play_track(first, Some(tracks));
            }
            None => {
                warn!("Playlist resolved to no playable tracks");
                self.emit_error("Playlist has no playable tracks".to_string());
            }
        }
    }

    /// Request a catalog lookup of `id`, played once it resolves
    pub fn request_track(&mut self, id: TrackId) -> FetchRequest {
        debug!(track_id = %id, "Requesting track by id");
        self.begin_fetch(FetchPurpose::ById(id))
    }

    /// Request resolution of playlist `ids`, installed as the queue once done
    pub fn request_playlist(&mut self, ids: Vec<TrackId>) -> FetchRequest {
        debug!(tracks = ids.len(), "Requesting playlist resolution");
        self.begin_fetch(FetchPurpose::Playlist(ids))
    }

    // ===== Mode =====

    /// Switch playback mode
    ///
    /// - Shuffle: play order becomes a fresh permutation of the original order
    /// - Normal: play order goes back to the original order
    /// - Radio: a radio track is requested right away
    /// - SmartShuffle: only changes what a track end does
    pub fn set_mode(&mut self, mode: PlaybackMode) -> Option<FetchRequest> {
        if mode == self.mode {
            return None;
        }

        info!(from = ?self.mode, to = ?mode, "Playback mode changed");
        self.cancel_fetch();
        self.mode = mode;
        self.persist(KEY_MODE, &mode);
        self.pending_events.push(PlaybackEvent::ModeChanged { mode });

        match mode {
            PlaybackMode::Shuffle | PlaybackMode::Normal
                if self.queue.original_order().is_empty() =>
            {
                // Nothing installed yet (radio-only session), keep the play order
                debug!(length = self.queue.len(), "No original order, play order kept");
                None
            }
            PlaybackMode::Shuffle => {
                self.queue.shuffle(self.current_track.as_ref(), &mut self.rng);
                self.emit_queue_changed();
                None
            }
            PlaybackMode::Normal => {
                self.queue.restore_original(self.current_track.as_ref());
                self.emit_queue_changed();
                None
            }
            PlaybackMode::Radio => Some(self.begin_fetch(FetchPurpose::Radio)),
            PlaybackMode::SmartShuffle => None,
        }
    }

    // ===== Queue Management =====

    /// Move the queue entry at `from` to `to`
    pub fn reorder_queue(&mut self, from: usize, to: usize) {
        match self.queue.reorder(from, to) {
            Ok(()) => self.emit_queue_changed(),
            Err(e) => warn!(from, to, error = %e, "Reorder rejected"),
        }
    }

    /// Remove the queue entry at `index` (the current entry is protected)
    pub fn remove_from_queue(&mut self, index: usize) {
        match self.queue.remove(index) {
            Ok(track) => {
                debug!(index, track_id = %track.id, "Removed from queue");
                self.emit_queue_changed();
            }
            Err(PlaybackError::RemoveCurrent(_)) => {
                debug!(index, "Refusing to remove the current track");
            }
            Err(e) => warn!(index, error = %e, "Remove rejected"),
        }
    }

    /// Collapse the queue to the current track; playback continues
    pub fn clear_queue(&mut self) {
        self.queue.collapse_to(self.current_track.clone());
        self.emit_queue_changed();
    }

    // ===== Position, Volume, Rate =====

    /// Seek to `position_secs` (clamped into the known duration)
    pub fn seek(&mut self, position_secs: f64) {
        if !position_secs.is_finite() {
            warn!(position_secs, "Ignoring non-finite seek");
            return;
        }

        let mut position = position_secs.max(0.0);
        if self.duration_secs > 0.0 {
            position = position.min(self.duration_secs);
        }

        self.current_time_secs = position;
        self.sink.seek(position);
    }

    /// Seek by `delta_secs` relative to the current position
    pub fn seek_relative(&mut self, delta_secs: f64) {
        self.seek(self.current_time_secs + delta_secs);
    }

    /// Set volume level (0.0-1.0), unmuting if muted
    pub fn set_volume(&mut self, level: f32) {
        self.volume.set_level(level);
        self.volume_changed(true);
    }

    /// Change volume by `delta`
    pub fn adjust_volume(&mut self, delta: f32) {
        self.volume.adjust(delta);
        self.volume_changed(true);
    }

    /// Mute (the level is remembered)
    pub fn mute(&mut self) {
        self.volume.mute();
        self.volume_changed(false);
    }

    /// Unmute, restoring the pre-mute level
    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.volume_changed(false);
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.volume_changed(false);
    }

    /// Set playback rate (clamped to the configured range)
    pub fn set_playback_rate(&mut self, rate: f32) {
        if !rate.is_finite() {
            warn!(rate, "Ignoring non-finite playback rate");
            return;
        }

        self.playback_rate = rate.clamp(
            self.config.min_playback_rate,
            self.config.max_playback_rate,
        );
        self.sink.set_playback_rate(self.playback_rate);
        self.persist(KEY_PLAYBACK_RATE, &self.playback_rate);
        self.pending_events.push(PlaybackEvent::RateChanged {
            rate: self.playback_rate,
        });
    }

    // ===== Statistics =====

    /// Listening-time timer tick
    ///
    /// Counts only while playback is intended and a track is loaded,
    /// regardless of whether the sink actually progresses.
    pub fn tick_listening(&mut self, elapsed_secs: f64) {
        if self.is_playing && self.current_track.is_some() {
            self.stats.add_listening(elapsed_secs);
        }
    }

    /// Clear history, play counts and listening time
    pub fn wipe_stats(&mut self) {
        self.stats.wipe();
    }

    // ===== State Queries =====

    /// Point-in-time copy of the session
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.current_track.clone(),
            is_playing: self.is_playing,
            current_time_secs: self.current_time_secs,
            duration_secs: self.duration_secs,
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            playback_rate: self.playback_rate,
            mode: self.mode,
            queue: self.queue.tracks().to_vec(),
            current_index: self.queue.current_index(),
            loading: self.loading(),
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time_secs(&self) -> f64 {
        self.current_time_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn volume(&self) -> f32 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Play order
    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    /// Order installed by the last "play with queue" action
    pub fn original_order(&self) -> &[Track] {
        self.queue.original_order()
    }

    /// Purpose of the in-flight fetch, if any
    pub fn loading(&self) -> Option<FetchPurpose> {
        self.pending_fetch.as_ref().map(|request| request.purpose.clone())
    }

    pub fn pending_fetch(&self) -> Option<FetchRequest> {
        self.pending_fetch.clone()
    }

    pub fn history(&self) -> &History {
        self.stats.history()
    }

    pub fn stats(&self) -> &StatsRecorder {
        &self.stats
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Internals =====

    fn on_track_ended(&mut self) -> Option<FetchRequest> {
        if let Some(track) = &self.current_track {
            self.pending_events.push(PlaybackEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }

        match self.mode {
            PlaybackMode::Normal | PlaybackMode::Shuffle => {
                self.advance_queue();
                None
            }
            PlaybackMode::SmartShuffle => {
                if self.queue.is_empty() {
                    return None;
                }
                if should_inject(self.config.smart_shuffle_probability, &mut self.rng) {
                    Some(self.begin_fetch(FetchPurpose::Injection))
                } else {
                    self.advance_queue();
                    None
                }
            }
            PlaybackMode::Radio => Some(self.begin_fetch(FetchPurpose::Radio)),
        }
    }

    /// Step to the next queue entry and start it (no-op on an empty queue)
    fn advance_queue(&mut self) {
        self.cancel_fetch();
        match self.queue.advance() {
            Ok(track) => {
                let track = track.clone();
                self.start_track(track);
            }
            Err(e) => debug!(error = %e, "Next ignored"),
        }
    }

    /// Make `track` current and start it from 0
    fn start_track(&mut self, track: Track) {
        let previous_track_id = self.current_track.as_ref().map(|t| t.id.clone());

        debug!(track_id = %track.id, title = %track.title, "Starting track");
        self.sink.load(&track.media_url);
        self.sink.play();
        self.stats.record_start(&track);

        self.current_time_secs = 0.0;
        self.duration_secs = track.duration_secs;
        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: track.id.clone(),
            previous_track_id,
        });
        self.current_track = Some(track);

        if !self.is_playing {
            self.is_playing = true;
            self.emit_state_changed();
        }
    }

    /// Change transport intent and drive the sink
    fn set_playing(&mut self, playing: bool) {
        if self.is_playing == playing {
            return;
        }

        self.is_playing = playing;
        if self.current_track.is_some() {
            if playing {
                self.sink.play();
            } else {
                self.sink.pause();
            }
        }
        self.emit_state_changed();
    }

    /// Adopt a transport change the sink made on its own
    fn sync_playing(&mut self, playing: bool) {
        if self.is_playing != playing {
            self.is_playing = playing;
            self.emit_state_changed();
        }
    }

    fn begin_fetch(&mut self, purpose: FetchPurpose) -> FetchRequest {
        self.last_ticket += 1;
        let request = FetchRequest {
            ticket: FetchTicket(self.last_ticket),
            purpose,
        };

        if let Some(previous) = self.pending_fetch.replace(request.clone()) {
            debug!(ticket = previous.ticket.0, "Superseding in-flight fetch");
        }
        debug!(ticket = request.ticket.0, purpose = ?request.purpose, "Requesting catalog fetch");
        self.pending_events.push(PlaybackEvent::Loading {
            purpose: request.purpose.clone(),
        });
        request
    }

    /// Claim the in-flight fetch if `ticket` is still the latest one
    fn take_pending(&mut self, ticket: FetchTicket) -> Option<FetchRequest> {
        match &self.pending_fetch {
            Some(request) if request.ticket == ticket => self.pending_fetch.take(),
            _ => {
                debug!(ticket = ticket.0, "Discarding stale fetch result");
                None
            }
        }
    }

    fn cancel_fetch(&mut self) {
        if let Some(request) = self.pending_fetch.take() {
            debug!(ticket = request.ticket.0, purpose = ?request.purpose, "Cancelled in-flight fetch");
        }
    }

    fn volume_changed(&mut self, persist_level: bool) {
        self.sink.set_volume(self.volume.gain());
        if persist_level {
            self.persist(KEY_VOLUME, &self.volume.level());
        }
        self.pending_events.push(PlaybackEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.store.set(key, value) {
            warn!(key, error = %e, "Failed to persist player setting");
        }
    }

    fn emit_state_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::StateChanged {
            is_playing: self.is_playing,
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit_error(&mut self, message: String) {
        self.pending_events.push(PlaybackEvent::Error { message });
    }
}

impl std::fmt::Debug for PlaybackManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackManager")
            .field("current_track", &self.current_track.as_ref().map(|t| &t.id))
            .field("is_playing", &self.is_playing)
            .field("mode", &self.mode)
            .field("queue_len", &self.queue.len())
            .field("current_index", &self.queue.current_index())
            .field("pending_fetch", &self.pending_fetch)
            .finish_non_exhaustive()
    }
}
