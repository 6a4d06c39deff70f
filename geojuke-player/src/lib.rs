//! # GeoJuke Player Library (geojuke-player)
//!
//! Proximity-triggered crossfade playback engine.
//!
//! **Purpose:** Resolve the nearest pin from a live location stream, decide
//! when a track change is warranted, and execute an artifact-free crossfade
//! between two audio channels, with pause/resume control exposed over an
//! HTTP/SSE interface.
//!
//! **Architecture:** location stream → proximity resolver → track selector
//! → crossfade engine → dual rodio sinks. Data flow is one-directional; the
//! crossfade engine owns the only long-lived mutable playback state.

pub mod api;
pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod jukebox;
pub mod location;
pub mod playback;
pub mod selector;

pub use error::{Error, Result};
pub use jukebox::Jukebox;
pub use playback::CrossfadeEngine;
