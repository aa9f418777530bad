//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// These never escape the public `PlaybackManager` operations; the manager
/// logs them and leaves its state untouched.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Queue is empty
    #[error("Queue is empty")]
    QueueEmpty,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (queue length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The now-playing entry cannot be removed
    #[error("Cannot remove the current track (index {0})")]
    RemoveCurrent(usize),

    /// The player loop has shut down
    #[error("Player loop is no longer running")]
    ChannelClosed,

    /// Collaborator failure
    #[error(transparent)]
    Core(#[from] vlone_core::VloneError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
