//! Error types for acr-client.

use thiserror::Error;

/// Key-value storage error types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key cannot be mapped to a storage location.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The persisted value could not be read, so it must not be replaced.
    #[error("Stored history could not be read ({0}); refusing to overwrite it")]
    Unreadable(String),

    /// Data directory could not be determined.
    #[error("Could not determine data directory")]
    DataDirNotFound,
}

/// Errors from talking to the server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure.
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A success response whose body is not JSON.
    #[error("Invalid response from server: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
