//! Crossfade envelope math
//!
//! Pure timing/volume computation for the linear crossfade. The engine's
//! tick task calls [`progress`] with the elapsed fade time and applies `t`
//! to the incoming channel and `1 - t` to the outgoing channel.
//!
//! The envelope is linear rather than constant-power: fade windows are
//! long and both tracks play simultaneously throughout, so the midpoint
//! loudness dip is not audible in practice.

use std::time::Duration;

/// Crossfade timing parameters
#[derive(Debug, Clone, Copy)]
pub struct FadeSettings {
    /// Volume ramp length, pre-roll excluded
    pub duration: Duration,
    /// Initial window during which the incoming channel plays silently,
    /// hiding an audible blip on tracks with a silent lead-in
    pub pre_roll: Duration,
    /// Envelope tick interval
    pub tick: Duration,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(10_000),
            pre_roll: Duration::from_millis(200),
            tick: Duration::from_millis(30),
        }
    }
}

/// Normalized fade progress at `elapsed` time since fade start.
///
/// Returns `clamp((elapsed - pre_roll) / duration, 0, 1)`: held at 0.0
/// through the pre-roll window, 1.0 from `pre_roll + duration` onward.
pub fn progress(elapsed: Duration, pre_roll: Duration, duration: Duration) -> f64 {
    if elapsed <= pre_roll {
        return 0.0;
    }
    if duration.is_zero() {
        return 1.0;
    }
    let ramp = (elapsed - pre_roll).as_secs_f64() / duration.as_secs_f64();
    ramp.clamp(0.0, 1.0)
}
