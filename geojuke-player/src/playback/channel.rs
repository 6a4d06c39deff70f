//! Audio channel and session abstractions
//!
//! The crossfade engine owns exactly two [`Channel`] handles and flips
//! between them; nothing else may touch their volume or transport state.
//! Transport calls (`play`/`pause`/`set_volume`) are fire-and-forget: the
//! engine does not wait for them to take effect before scheduling the next
//! envelope tick. Only `load` is fallible, because a failed load must leave
//! the currently audible channel untouched.

use crate::error::Result;
use geojuke_common::model::AudioSource;
use tracing::debug;

/// One of the engine's two audio channels.
pub trait Channel: Send + Sync {
    /// Replace the channel's source. The channel ends up paused at its
    /// previously set volume; playback resumes on the next `play`.
    fn load(&self, source: &AudioSource) -> Result<()>;

    /// Start or resume playback.
    fn play(&self);

    /// Suspend playback, keeping position and loaded source.
    fn pause(&self);

    /// Set channel volume, 0.0 to 1.0.
    fn set_volume(&self, volume: f32);
}

/// Platform audio-session coordination primitive.
///
/// A boolean "set active" used to cooperate with the platform's
/// background/mixing behavior. Failures are non-fatal by contract: the
/// engine logs them and keeps its reported pause state consistent with
/// user intent.
pub trait AudioSession: Send + Sync {
    fn set_active(&self, active: bool) -> Result<()>;
}

/// Channel that plays nothing; used for headless runs and tests.
#[derive(Debug, Default, Clone)]
pub struct NullChannel;

impl Channel for NullChannel {
    fn load(&self, source: &AudioSource) -> Result<()> {
        debug!("null channel load: {}", source);
        Ok(())
    }

    fn play(&self) {}

    fn pause(&self) {}

    fn set_volume(&self, _volume: f32) {}
}

/// Session primitive that always succeeds.
#[derive(Debug, Default, Clone)]
pub struct NullSession;

impl AudioSession for NullSession {
    fn set_active(&self, active: bool) -> Result<()> {
        debug!("null audio session set_active({active})");
        Ok(())
    }
}
