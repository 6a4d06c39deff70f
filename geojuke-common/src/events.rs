//! Event types for the GeoJuke event system
//!
//! Events are broadcast by the player and consumed by the interface layer
//! (SSE clients, map highlighting).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playback state of the crossfade engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Nothing loaded
    Idle,
    /// A crossfade envelope is running
    FadingIn,
    /// Active channel settled at full volume
    Steady,
    /// Playback suspended by the user
    Paused,
}

/// GeoJuke event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Playback state changed
    PlaybackStateChanged {
        state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The nearest pin changed (None when no pin resolves)
    NearestPinChanged {
        pin_id: Option<Uuid>,
        squared_distance: Option<f64>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The selector issued a track-change request
    TrackChangeRequested {
        pin_id: Uuid,
        song_id: Uuid,
        source_key: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A crossfade envelope started
    CrossfadeStarted {
        source_key: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A crossfade envelope ran to completion
    CrossfadeCompleted {
        source_key: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A song's audio source finished resolving to a playable path
    SourceResolved {
        song_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayerEvent {
    /// Event type string for the SSE `event:` field
    pub fn type_str(&self) -> &'static str {
        match self {
            PlayerEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            PlayerEvent::NearestPinChanged { .. } => "NearestPinChanged",
            PlayerEvent::TrackChangeRequested { .. } => "TrackChangeRequested",
            PlayerEvent::CrossfadeStarted { .. } => "CrossfadeStarted",
            PlayerEvent::CrossfadeCompleted { .. } => "CrossfadeCompleted",
            PlayerEvent::SourceResolved { .. } => "SourceResolved",
        }
    }
}
