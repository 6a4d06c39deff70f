//! Crossfade engine and channel abstraction

pub mod channel;
pub mod engine;
pub mod envelope;

pub use channel::{AudioSession, Channel, NullChannel, NullSession};
pub use engine::CrossfadeEngine;
pub use envelope::FadeSettings;
pub use geojuke_common::events::PlaybackState;
