//! Integration tests for the playlists slice
//!
//! Tests playlist operations including:
//! - CRUD and id generation
//! - Idempotent membership and insertion order
//! - Persistence through the SQLite store
//! - Unknown ids, failing stores and unreadable stored entries
//! - Concurrent writers


use serde_json::json;
use std::sync::Arc;
use std::thread;
use test_helpers::*;
use vlone_core::{KeyValueStore, TrackId};
use vlone_storage::{PlaylistStore, SqliteStore, StorageError, KEY_PLAYLISTS};

#[test]
fn test_create_and_get_playlist() {
    let store = memory_playlists();

    let playlist = store.create("My Favorites").expect("Failed to create playlist");
    assert_eq!(playlist.name, "My Favorites");
    assert!(playlist.track_ids.is_empty());
    assert_eq!(playlist.description, None);

    let retrieved = store.get(&playlist.id).unwrap();
    assert_eq!(retrieved, playlist);
}

#[test]
fn test_list_keeps_creation_order() {
    let store = memory_playlists();
    for name in ["A", "B", "C"] {
        store.create(name).unwrap();
    }

    let names: Vec<String> = store.list().unwrap().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn test_blank_name_is_rejected() {
    let store = memory_playlists();

    assert!(matches!(store.create("   "), Err(StorageError::InvalidInput(_))));
    assert!(store.list().unwrap().is_empty());

    let playlist = store.create("Keep").unwrap();
    assert!(matches!(
        store.rename(&playlist.id, ""),
        Err(StorageError::InvalidInput(_))
    ));
    assert_eq!(store.get(&playlist.id).unwrap().name, "Keep");
}

#[test]
fn test_rename_playlist() {
    let store = memory_playlists();
    let playlist = store.create("Old").unwrap();

    let renamed = store.rename(&playlist.id, "New").unwrap();

    assert_eq!(renamed.id, playlist.id);
    assert_eq!(store.get(&playlist.id).unwrap().name, "New");
}

#[test]
fn test_add_track_is_idempotent_and_ordered() {
    let store = memory_playlists();
    let playlist = store.create("Mix").unwrap();

    assert!(store.add_track(&playlist.id, "3".into()).unwrap());
    assert!(store.add_track(&playlist.id, "1".into()).unwrap());
    assert!(!store.add_track(&playlist.id, "3".into()).unwrap());
    assert!(store.add_track(&playlist.id, "2".into()).unwrap());

    let ids: Vec<String> = store
        .get(&playlist.id)
        .unwrap()
        .track_ids
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
}

#[test]
fn test_remove_track() {
    let store = memory_playlists();
    let playlist = store.create("Mix").unwrap();
    store.add_track(&playlist.id, "a".into()).unwrap();
    store.add_track(&playlist.id, "b".into()).unwrap();

    assert!(store.remove_track(&playlist.id, &TrackId::new("a")).unwrap());
    assert!(!store.remove_track(&playlist.id, &TrackId::new("a")).unwrap());

    assert_eq!(store.get(&playlist.id).unwrap().track_ids, vec![TrackId::new("b")]);
}

#[test]
fn test_membership_is_per_playlist() {
    let store = memory_playlists();
    let first = store.create("First").unwrap();
    let second = store.create("Second").unwrap();

    store.add_track(&first.id, "x".into()).unwrap();

    assert!(store.get(&second.id).unwrap().track_ids.is_empty());
    assert!(store.add_track(&second.id, "x".into()).unwrap());
}

#[test]
fn test_delete_playlist() {
    let store = memory_playlists();
    let keep = store.create("Keep").unwrap();
    let gone = store.create("Gone").unwrap();

    store.delete(&gone.id).unwrap();

    assert_eq!(store.list().unwrap(), vec![keep]);
    assert!(matches!(
        store.get(&gone.id),
        Err(StorageError::PlaylistNotFound(_))
    ));
}

#[test]
fn test_unknown_id_is_not_found() {
    let store = memory_playlists();
    let missing = vlone_core::PlaylistId::new("missing");

    assert!(matches!(store.get(&missing), Err(StorageError::PlaylistNotFound(_))));
    assert!(matches!(store.delete(&missing), Err(StorageError::PlaylistNotFound(_))));
    assert!(matches!(
        store.add_track(&missing, "a".into()),
        Err(StorageError::PlaylistNotFound(_))
    ));
    assert!(matches!(
        store.remove_track(&missing, &TrackId::new("a")),
        Err(StorageError::PlaylistNotFound(_))
    ));
}

#[test]
fn test_wipe_removes_everything() {
    let backend = memory_backend();
    let store = PlaylistStore::new(backend.clone());
    store.create("A").unwrap();
    store.create("B").unwrap();

    store.wipe().unwrap();

    assert!(store.list().unwrap().is_empty());
    assert_eq!(backend.get_value(KEY_PLAYLISTS).unwrap(), None);
}

#[test]
fn test_playlists_survive_reopen() {
    let temp = TestDir::new();
    let path = temp.store_path();

    let id = {
        let store = PlaylistStore::new(Arc::new(SqliteStore::open(&path).unwrap()));
        let playlist = store.create("On disk").unwrap();
        store.add_track(&playlist.id, "42".into()).unwrap();
        playlist.id
    };

    let reopened = PlaylistStore::new(Arc::new(SqliteStore::open(&path).unwrap()));
    let playlist = reopened.get(&id).unwrap();
    assert_eq!(playlist.name, "On disk");
    assert_eq!(playlist.track_ids, vec![TrackId::new("42")]);
}

#[test]
fn test_write_failure_is_reported_and_nothing_changes() {
    let store = PlaylistStore::new(Arc::new(ReadOnlyStore::default()));

    let result = store.create("Nope");

    assert!(matches!(result, Err(StorageError::Backend(_))));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_unreadable_entry_blocks_writes_instead_of_being_dropped() {
    let backend = memory_backend();
    let store = PlaylistStore::new(backend.clone());
    let keep = store.create("Keep me").unwrap();

    // Entry written by an older build with another layout
    let mut stored = backend.get_value(KEY_PLAYLISTS).unwrap().unwrap();
    stored
        .as_array_mut()
        .unwrap()
        .push(json!({ "songIds": ["1", "2"] }));
    backend.set_value(KEY_PLAYLISTS, stored.clone()).unwrap();

    assert_eq!(store.list().unwrap(), vec![keep.clone()]);
    assert_eq!(store.get(&keep.id).unwrap().name, "Keep me");

    assert!(matches!(
        store.create("New"),
        Err(StorageError::SerializationError(_))
    ));
    assert!(matches!(
        store.add_track(&keep.id, "3".into()),
        Err(StorageError::SerializationError(_))
    ));
    assert!(matches!(
        store.delete(&keep.id),
        Err(StorageError::SerializationError(_))
    ));
    assert_eq!(backend.get_value(KEY_PLAYLISTS).unwrap(), Some(stored));

    store.wipe().unwrap();
    store.create("New").unwrap();
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_concurrent_writers_keep_every_change() {
    let store = memory_playlists();
    let playlist = store.create("Shared").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = store.clone();
            let id = playlist.id.clone();
            thread::spawn(move || {
                for n in 0..10 {
                    store
                        .add_track(&id, TrackId::new(format!("{worker}-{n}")))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.get(&playlist.id).unwrap().track_ids.len(), 80);
}
