/// Core error types for Vlone Player
use thiserror::Error;

use crate::types::{PlaylistId, TrackId};

/// Result type alias using `VloneError`
pub type Result<T> = std::result::Result<T, VloneError>;

/// Core error type for Vlone Player
#[derive(Error, Debug)]
pub enum VloneError {
    /// Catalog does not know the requested track
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Catalog unreachable or answered with a server error
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl VloneError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the error means the catalog has no such track
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TrackNotFound(_))
    }
}

impl From<config::ConfigError> for VloneError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
