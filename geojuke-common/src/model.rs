//! Core data model for the location-aware jukebox
//!
//! All of these are immutable snapshots from the caller's perspective:
//! the playback pipeline never mutates pins or songs, and locations are
//! overwritten on every update rather than accumulated.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A device position sample from the platform location stream.
///
/// Ephemeral; owned by the resolver's caller and replaced on each update.
/// Samples are assumed to arrive in non-decreasing time order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A geolocated anchor point bound to a song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    /// Free-form note attached when the pin was dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub song_id: Uuid,
}

/// Catalog song record.
///
/// `audio_url` resolves lazily (the catalog may still be fetching it) and
/// `bpm` is optional metadata consumed by the interface layer for visual
/// pulse cadence; both must be tolerated as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    /// Locator for the audio payload: a local path or an http(s) URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
}

/// A resolved, locally playable audio locator.
///
/// Its string form doubles as the source key used to deduplicate repeated
/// track-change triggers for the same audio.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioSource(pub String);

impl AudioSource {
    /// Identity token for trigger deduplication
    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AudioSource {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// On-disk catalog snapshot: the read-only data-source boundary.
///
/// Produced by the external catalog store, consumed by the player; the
/// playback pipeline never writes it back.
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogFile {
    pub songs: Vec<Song>,
    pub pins: Vec<Pin>,
}

impl CatalogFile {
    /// Parse a catalog snapshot from a JSON file.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Result of a nearest-pin search.
///
/// Derived state: recomputed on every location or catalog update, never
/// persisted. "No nearest pin" is represented as `Option::<Self>::None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestResolution {
    pub pin: Pin,
    /// Planar squared distance in degrees²; comparable, not metric
    pub squared_distance: f64,
}
