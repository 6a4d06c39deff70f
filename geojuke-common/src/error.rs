//! Common error types for GeoJuke

use thiserror::Error;

/// Common result type for GeoJuke operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by GeoJuke crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
