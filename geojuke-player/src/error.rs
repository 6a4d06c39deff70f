//! Error types for geojuke-player
//!
//! Module-specific error types using thiserror. Playback-path failures
//! (channel loads, session activation) are recovered locally by the engine
//! and never propagate out of it; these types cover the fallible setup and
//! catalog paths.

use thiserror::Error;

/// Result type for geojuke-player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the geojuke-player crate
#[derive(Error, Debug)]
pub enum Error {
    /// Errors bubbled up from geojuke-common
    #[error(transparent)]
    Common(#[from] geojuke_common::Error),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog loading or lookup errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A channel source failed to open or decode
    #[error("Audio load error: {0}")]
    Load(String),

    /// Audio output device or backend-thread errors
    #[error("Audio output error: {0}")]
    Audio(String),

    /// Audio session activation/deactivation errors
    #[error("Audio session error: {0}")]
    Session(String),

    /// File I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
