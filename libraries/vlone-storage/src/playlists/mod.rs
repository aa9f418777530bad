//! Playlist persistence
//!
//! Playlists live independently of the playback queue. The whole list is
//! stored as one JSON array under [`KEY_PLAYLISTS`]; every mutation reads the
//! current list, applies the change and writes it back while holding the
//! store's write lock.
//!
//! Reads skip entries that no longer decode. Mutations refuse to run while
//! such entries exist, since writing back would drop them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};
use vlone_core::{KeyValueStore, KeyValueStoreExt, Playlist, PlaylistId, TrackId};

use crate::error::{Result, StorageError};

/// Store key holding every playlist
pub const KEY_PLAYLISTS: &str = "library.playlists";

/// CRUD over user playlists
///
/// Clones share one write lock, so mutations through any clone are
/// serialized. Writers outside this process are not coordinated.
#[derive(Clone)]
pub struct PlaylistStore {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl PlaylistStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All readable playlists, in creation order
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be read or the stored value is not a list.
    pub fn list(&self) -> Result<Vec<Playlist>> {
        let entries = self.store.get_entries::<Playlist>(KEY_PLAYLISTS)?;
        if !entries.is_complete() {
            warn!(skipped = entries.skipped, "Skipping unreadable playlists");
        }
        Ok(entries.items)
    }

    /// Get a playlist by id
    pub fn get(&self, id: &PlaylistId) -> Result<Playlist> {
        self.list()?
            .into_iter()
            .find(|p| p.id == *id)
            .ok_or_else(|| StorageError::PlaylistNotFound(id.clone()))
    }

    /// Create an empty playlist with a fresh id
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name.
    pub fn create(&self, name: &str) -> Result<Playlist> {
        let name = validate_name(name)?;

        let _guard = self.lock();
        let playlist = Playlist::new(name);
        let mut playlists = self.load_for_update()?;
        playlists.push(playlist.clone());
        self.save(&playlists)?;

        info!(playlist_id = %playlist.id, name = %playlist.name, "Created playlist");
        Ok(playlist)
    }

    pub fn rename(&self, id: &PlaylistId, name: &str) -> Result<Playlist> {
        let name = validate_name(name)?;
        self.update(id, |playlist| {
            playlist.name = name;
        })
    }

    pub fn set_description(&self, id: &PlaylistId, description: Option<String>) -> Result<Playlist> {
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.update(id, |playlist| {
            playlist.description = description;
        })
    }

    pub fn delete(&self, id: &PlaylistId) -> Result<()> {
        let _guard = self.lock();
        let mut playlists = self.load_for_update()?;
        let before = playlists.len();
        playlists.retain(|p| p.id != *id);

        if playlists.len() == before {
            return Err(StorageError::PlaylistNotFound(id.clone()));
        }

        self.save(&playlists)?;
        info!(playlist_id = %id, "Deleted playlist");
        Ok(())
    }

    /// Append a track if it is not already a member
    ///
    /// Returns `false` when the track was already in the playlist.
    pub fn add_track(&self, id: &PlaylistId, track_id: TrackId) -> Result<bool> {
        let mut added = false;
        self.update(id, |playlist| {
            added = playlist.add_track(track_id);
        })?;

        if !added {
            debug!(playlist_id = %id, "Track already in playlist");
        }
        Ok(added)
    }

    /// Remove a track from the playlist
    ///
    /// Returns `false` when the track was not a member.
    pub fn remove_track(&self, id: &PlaylistId, track_id: &TrackId) -> Result<bool> {
        let mut removed = false;
        self.update(id, |playlist| {
            removed = playlist.remove_track(track_id);
        })?;
        Ok(removed)
    }

    /// Delete every playlist, unreadable ones included
    pub fn wipe(&self) -> Result<()> {
        let _guard = self.lock();
        self.store.remove(KEY_PLAYLISTS)?;
        info!("Wiped all playlists");
        Ok(())
    }

    fn update(&self, id: &PlaylistId, apply: impl FnOnce(&mut Playlist)) -> Result<Playlist> {
        let _guard = self.lock();
        let mut playlists = self.load_for_update()?;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or_else(|| StorageError::PlaylistNotFound(id.clone()))?;

        apply(playlist);
        let updated = playlist.clone();

        self.save(&playlists)?;
        Ok(updated)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every stored playlist, refusing when any entry fails to decode
    fn load_for_update(&self) -> Result<Vec<Playlist>> {
        let entries = self.store.get_entries::<Playlist>(KEY_PLAYLISTS)?;
        if !entries.is_complete() {
            warn!(skipped = entries.skipped, "Unreadable playlists stored, refusing to overwrite");
            return Err(StorageError::SerializationError(format!(
                "{} stored playlist(s) could not be read",
                entries.skipped
            )));
        }
        Ok(entries.items)
    }

    fn save(&self, playlists: &[Playlist]) -> Result<()> {
        self.store.set(KEY_PLAYLISTS, playlists)?;
        Ok(())
    }
}

impl std::fmt::Debug for PlaylistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistStore").finish_non_exhaustive()
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::InvalidInput(
            "Playlist name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}
