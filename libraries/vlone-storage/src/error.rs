/// Storage-specific errors
use thiserror::Error;
use vlone_core::PlaylistId;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// No playlist with this id
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Rejected input (blank playlist name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Underlying key-value store refused the operation
    #[error("Store error: {0}")]
    Backend(String),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<vlone_core::VloneError> for StorageError {
    fn from(err: vlone_core::VloneError) -> Self {
        match err {
            vlone_core::VloneError::PlaylistNotFound(id) => Self::PlaylistNotFound(id),
            vlone_core::VloneError::Io(e) => Self::Io(e),
            vlone_core::VloneError::Serialization(e) => Self::from(e),
            vlone_core::VloneError::Storage(msg) => Self::Backend(msg),
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<StorageError> for vlone_core::VloneError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PlaylistNotFound(id) => Self::PlaylistNotFound(id),
            StorageError::InvalidInput(msg) => Self::InvalidInput(msg),
            StorageError::Io(e) => Self::Io(e),
            StorageError::Backend(msg) => Self::Storage(msg),
            other => Self::storage(other.to_string()),
        }
    }
}
