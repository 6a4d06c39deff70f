//! # GeoJuke Common Library
//!
//! Shared code for the GeoJuke location-aware jukebox:
//! - Data model (locations, pins, songs, audio sources)
//! - Proximity resolution (nearest-pin search)
//! - Event types (PlayerEvent enum)
//! - Error types
//!
//! The proximity resolver lives here rather than in the player because the
//! interface layer derives the highlighted pin from the same computation
//! the playback pipeline uses.

pub mod error;
pub mod events;
pub mod geo;
pub mod model;

pub use error::{Error, Result};
pub use events::{PlaybackState, PlayerEvent};
pub use geo::nearest_pin;
pub use model::{AudioSource, CatalogFile, Location, NearestResolution, Pin, Song};
