//! Error types for the catalog client.

use thiserror::Error;
use vlone_core::{TrackId, VloneError};

/// Errors that can occur when talking to the catalog API.
#[derive(Error, Debug)]
pub enum CatalogClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Catalog has no such track
    #[error("Track not found: {0}")]
    NotFound(String),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline, unreachable or timed out
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl CatalogClientError {
    /// Classify a transport error
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::ServerUnreachable(err.to_string())
        } else {
            Self::Request(err)
        }
    }
}

impl From<url::ParseError> for CatalogClientError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<CatalogClientError> for VloneError {
    fn from(err: CatalogClientError) -> Self {
        match err {
            CatalogClientError::NotFound(id) => Self::TrackNotFound(TrackId::new(id)),
            CatalogClientError::InvalidUrl(msg) => Self::Config(msg),
            other => Self::unavailable(other.to_string()),
        }
    }
}

/// Result type for catalog client operations.
pub type Result<T> = std::result::Result<T, CatalogClientError>;
