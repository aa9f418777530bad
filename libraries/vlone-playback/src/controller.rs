//! Single-writer player loop
//!
//! [`PlayerService`] owns the [`PlaybackManager`] on one tokio task. Views,
//! keyboard/media-key bindings and the media sink all talk to it through a
//! cloneable [`PlayerHandle`]; catalog fetches run on their own tasks and feed
//! their outcome back into the loop, so every state mutation happens on the
//! loop task.
//!
//! Observers read state through a `watch` channel (latest snapshot) and a
//! `broadcast` channel (event stream). Dropping every handle stops the loop.

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::manager::PlaybackManager;
use crate::sink::SinkEvent;
use crate::types::{FetchPurpose, FetchRequest, FetchTicket, PlaybackMode, PlaybackSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};
use vlone_core::{CatalogClient, Track, TrackId};

/// Capacity of the event broadcast buffer
const EVENT_BUFFER: usize = 256;

/// Intents accepted by the player loop
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    PlayTrack {
        track: Track,
        queue: Option<Vec<Track>>,
    },
    /// Look the id up in the catalog, then play it
    PlayById(TrackId),
    /// Resolve every id (skipping failures) and play them as a new queue
    PlayPlaylist(Vec<TrackId>),
    TogglePlay,
    Play,
    Pause,
    Next,
    Prev,
    SetMode(PlaybackMode),
    ReorderQueue {
        from: usize,
        to: usize,
    },
    RemoveFromQueue(usize),
    ClearQueue,
    Seek(f64),
    SeekRelative(f64),
    SetVolume(f32),
    AdjustVolume(f32),
    Mute,
    Unmute,
    ToggleMute,
    SetPlaybackRate(f32),
    /// Event reported by the media sink
    Sink(SinkEvent),
    WipeStats,
}

/// Messages produced by the loop's own background tasks
enum Internal {
    FetchCompleted {
        ticket: FetchTicket,
        result: vlone_core::Result<Track>,
    },
    PlaylistResolved {
        ticket: FetchTicket,
        tracks: Vec<Track>,
    },
}

/// Player loop owning the playback manager
pub struct PlayerService {
    manager: PlaybackManager,
    catalog: Arc<dyn CatalogClient>,
    commands: mpsc::UnboundedReceiver<PlayerCommand>,
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    events_tx: broadcast::Sender<PlaybackEvent>,
}

impl PlayerService {
    /// Start the loop on the current tokio runtime
    pub fn spawn(manager: PlaybackManager, catalog: Arc<dyn CatalogClient>) -> PlayerHandle {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(manager.snapshot());
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        let handle = PlayerHandle {
            commands: commands_tx,
            snapshot: snapshot_rx,
            events: events_tx.clone(),
        };

        let service = Self {
            manager,
            catalog,
            commands,
            internal_tx,
            internal_rx,
            snapshot_tx,
            events_tx,
        };
        tokio::spawn(service.run());

        handle
    }

    async fn run(mut self) {
        let period = Duration::from_secs(self.manager.config().listening_tick_secs.max(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Player loop started");
        let request = self.manager.on_startup();
        self.dispatch(request);
        self.publish();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => {
                        self.handle_command(command);
                        self.publish();
                    }
                    None => break,
                },
                Some(message) = self.internal_rx.recv() => {
                    self.handle_internal(message);
                    self.publish();
                }
                _ = ticker.tick() => {
                    self.manager.tick_listening(period.as_secs_f64());
                }
            }
        }

        info!("Player loop stopped");
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        let request = match command {
            PlayerCommand::PlayTrack { track, queue } => {
                self.manager.play_track(track, queue);
                None
            }
            PlayerCommand::PlayById(id) => Some(self.manager.request_track(id)),
            PlayerCommand::PlayPlaylist(ids) => Some(self.manager.request_playlist(ids)),
            PlayerCommand::TogglePlay => {
                self.manager.toggle_play();
                None
            }
            PlayerCommand::Play => {
                self.manager.play();
                None
            }
            PlayerCommand::Pause => {
                self.manager.pause();
                None
            }
            PlayerCommand::Next => self.manager.next(),
            PlayerCommand::Prev => {
                self.manager.prev();
                None
            }
            PlayerCommand::SetMode(mode) => self.manager.set_mode(mode),
            PlayerCommand::ReorderQueue { from, to } => {
                self.manager.reorder_queue(from, to);
                None
            }
            PlayerCommand::RemoveFromQueue(index) => {
                self.manager.remove_from_queue(index);
                None
            }
            PlayerCommand::ClearQueue => {
                self.manager.clear_queue();
                None
            }
            PlayerCommand::Seek(position) => {
                self.manager.seek(position);
                None
            }
            PlayerCommand::SeekRelative(delta) => {
                self.manager.seek_relative(delta);
                None
            }
            PlayerCommand::SetVolume(level) => {
                self.manager.set_volume(level);
                None
            }
            PlayerCommand::AdjustVolume(delta) => {
                self.manager.adjust_volume(delta);
                None
            }
            PlayerCommand::Mute => {
                self.manager.mute();
                None
            }
            PlayerCommand::Unmute => {
                self.manager.unmute();
                None
            }
            PlayerCommand::ToggleMute => {
                self.manager.toggle_mute();
                None
            }
            PlayerCommand::SetPlaybackRate(rate) => {
                self.manager.set_playback_rate(rate);
                None
            }
            PlayerCommand::Sink(event) => self.manager.handle_sink_event(event),
            PlayerCommand::WipeStats => {
                self.manager.wipe_stats();
                None
            }
        };

        self.dispatch(request);
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::FetchCompleted { ticket, result } => {
                self.manager.complete_fetch(ticket, result);
            }
            Internal::PlaylistResolved { ticket, tracks } => {
                self.manager.complete_playlist(ticket, tracks);
            }
        }
    }

    /// Perform a catalog fetch requested by the manager
    ///
    /// The outcome comes back through the internal channel, tagged with the
    /// request's ticket.
    fn dispatch(&self, request: Option<FetchRequest>) {
        let Some(FetchRequest { ticket, purpose }) = request else {
            return;
        };

        let catalog = Arc::clone(&self.catalog);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let message = match purpose {
                FetchPurpose::Radio | FetchPurpose::Injection => Internal::FetchCompleted {
                    ticket,
                    result: catalog.fetch_random_track().await,
                },
                FetchPurpose::ById(id) => Internal::FetchCompleted {
                    ticket,
                    result: catalog.fetch_track(&id).await,
                },
                FetchPurpose::Playlist(ids) => Internal::PlaylistResolved {
                    ticket,
                    tracks: resolve_tracks(catalog.as_ref(), &ids).await,
                },
            };
            // The loop is gone when every handle dropped
            let _ = tx.send(message);
        });
    }

    /// Push drained events and the fresh snapshot to observers
    fn publish(&mut self) {
        for event in self.manager.drain_events() {
            // No subscribers is fine
            let _ = self.events_tx.send(event);
        }
        self.snapshot_tx.send_replace(self.manager.snapshot());
    }
}

/// Resolve track ids against the catalog, in order, skipping ids that fail
pub async fn resolve_tracks(catalog: &dyn CatalogClient, ids: &[TrackId]) -> Vec<Track> {
    let mut tracks = Vec::with_capacity(ids.len());
    for id in ids {
        match catalog.fetch_track(id).await {
            Ok(track) => tracks.push(track),
            Err(e) => warn!(track_id = %id, error = %e, "Skipping unresolvable track"),
        }
    }
    tracks
}

/// Cloneable handle to a running [`PlayerService`]
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::UnboundedSender<PlayerCommand>,
    snapshot: watch::Receiver<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl PlayerHandle {
    /// Submit a command to the loop
    pub fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::ChannelClosed)
    }

    pub fn play_track(&self, track: Track, queue: Option<Vec<Track>>) -> Result<()> {
        self.send(PlayerCommand::PlayTrack { track, queue })
    }

    pub fn play_by_id(&self, id: impl Into<TrackId>) -> Result<()> {
        self.send(PlayerCommand::PlayById(id.into()))
    }

    pub fn play_playlist(&self, ids: Vec<TrackId>) -> Result<()> {
        self.send(PlayerCommand::PlayPlaylist(ids))
    }

    pub fn toggle_play(&self) -> Result<()> {
        self.send(PlayerCommand::TogglePlay)
    }

    pub fn next(&self) -> Result<()> {
        self.send(PlayerCommand::Next)
    }

    pub fn prev(&self) -> Result<()> {
        self.send(PlayerCommand::Prev)
    }

    pub fn set_mode(&self, mode: PlaybackMode) -> Result<()> {
        self.send(PlayerCommand::SetMode(mode))
    }

    pub fn reorder_queue(&self, from: usize, to: usize) -> Result<()> {
        self.send(PlayerCommand::ReorderQueue { from, to })
    }

    pub fn remove_from_queue(&self, index: usize) -> Result<()> {
        self.send(PlayerCommand::RemoveFromQueue(index))
    }

    pub fn clear_queue(&self) -> Result<()> {
        self.send(PlayerCommand::ClearQueue)
    }

    pub fn seek(&self, position_secs: f64) -> Result<()> {
        self.send(PlayerCommand::Seek(position_secs))
    }

    pub fn set_volume(&self, level: f32) -> Result<()> {
        self.send(PlayerCommand::SetVolume(level))
    }

    pub fn set_playback_rate(&self, rate: f32) -> Result<()> {
        self.send(PlayerCommand::SetPlaybackRate(rate))
    }

    /// Forward an event reported by the media sink
    pub fn sink_event(&self, event: SinkEvent) -> Result<()> {
        self.send(PlayerCommand::Sink(event))
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot.clone()
    }

    /// Subscribe to the event stream (events sent before this call are not seen)
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }
}
