//! Crossfade engine
//!
//! Owns two audio channels and performs a timed volume-envelope handover
//! between them. This is the only long-lived mutable playback state in the
//! system: the active-channel designator, the playback state, the current
//! source key, and at most one in-flight fade.
//!
//! State machine: `Idle` → `FadingIn` → `Steady` → `Paused`. `FadingIn` is
//! re-entrant: a request arriving mid-fade cancels the running envelope and
//! starts a fresh one targeting the new source, with the channel that was
//! fading in becoming the new outgoing channel. Fades are never queued.
//!
//! Resilience contract: a failed track switch must never silence audio that
//! was already playing. Channel load failures are logged and leave volumes,
//! transport, and the state machine untouched.

use crate::playback::channel::{AudioSession, Channel};
use crate::playback::envelope::{self, FadeSettings};
use geojuke_common::events::{PlaybackState, PlayerEvent};
use geojuke_common::model::AudioSource;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Bookkeeping for the one in-flight fade.
struct Fade {
    /// Distinguishes this envelope from superseded ones
    epoch: u64,
    started: Instant,
    /// Set while paused mid-fade; the envelope clock is frozen
    paused_at: Option<Instant>,
    /// Total time spent paused, excluded from elapsed fade time
    paused_total: Duration,
    source_key: String,
    task: Option<JoinHandle<()>>,
}

impl Drop for Fade {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct EngineInner {
    /// Ping-pong channel pair; `active` indexes the channel the listener
    /// hears at full intended volume once steady
    channels: [Box<dyn Channel>; 2],
    active: usize,
    state: PlaybackState,
    /// Source key of the most recently started track, for status reporting
    current_key: Option<String>,
    fade: Option<Fade>,
    next_epoch: u64,
}

/// Proximity-triggered crossfade playback engine.
///
/// Construct one instance per playback session; all mutation goes through
/// its own transition logic. `crossfade_to` and `toggle_pause` are
/// fire-and-forget from the caller's perspective: failures are recovered
/// locally and logged, never propagated.
pub struct CrossfadeEngine {
    inner: Arc<Mutex<EngineInner>>,
    session: Arc<dyn AudioSession>,
    settings: FadeSettings,
    events: broadcast::Sender<PlayerEvent>,
}

/// Lock with poison recovery; engine state stays usable after a panicked
/// holder because every transition rewrites the fields it touches.
fn lock(inner: &Arc<Mutex<EngineInner>>) -> MutexGuard<'_, EngineInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CrossfadeEngine {
    /// Create a new engine owning the given channel pair.
    pub fn new(
        channels: [Box<dyn Channel>; 2],
        session: Arc<dyn AudioSession>,
        settings: FadeSettings,
        events: broadcast::Sender<PlayerEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner {
                channels,
                active: 0,
                state: PlaybackState::Idle,
                current_key: None,
                fade: None,
                next_epoch: 0,
            })),
            session,
            settings,
            events,
        }
    }

    /// Start a crossfade to `source`.
    ///
    /// Loads the source into the incoming channel, starts it silent, and
    /// spawns the envelope tick task. If a fade is already running it is
    /// cancelled and the previously-fading-in channel becomes the new
    /// outgoing channel. On load failure nothing changes: current playback
    /// (including an in-flight fade) continues uninterrupted.
    pub fn crossfade_to(&self, source: &AudioSource) {
        let mut inner = lock(&self.inner);

        // The channel that will ramp up. Mid-fade, the designator still
        // points at the old outgoing channel, which is the one to reuse.
        let superseding = inner.state == PlaybackState::FadingIn && inner.fade.is_some();
        let incoming = if superseding {
            inner.active
        } else {
            1 - inner.active
        };

        // Load before touching any running envelope, so a failed switch
        // leaves everything playing exactly as it was.
        if let Err(e) = inner.channels[incoming].load(source) {
            warn!("crossfade to {} failed, keeping current playback: {}", source, e);
            return;
        }

        // Cancel the superseded envelope and treat its incoming channel as
        // the new outgoing channel.
        inner.fade = None;
        if superseding {
            inner.active = 1 - inner.active;
        }

        // A track change while paused resumes playback, so the session
        // released by the pause has to be re-activated first.
        if inner.state == PlaybackState::Paused {
            if let Err(e) = self.session.set_active(true) {
                warn!("audio session activation failed: {}", e);
            }
        }

        inner.channels[incoming].set_volume(0.0);
        inner.channels[incoming].play();

        let key = source.key().to_string();
        let epoch = inner.next_epoch;
        inner.next_epoch += 1;
        inner.current_key = Some(key.clone());

        let prior_state = inner.state;
        inner.state = PlaybackState::FadingIn;
        inner.fade = Some(Fade {
            epoch,
            started: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
            source_key: key.clone(),
            task: None,
        });

        info!("crossfade started: {} (from {:?})", key, prior_state);
        self.emit(PlayerEvent::CrossfadeStarted {
            source_key: key,
            timestamp: chrono::Utc::now(),
        });
        if prior_state != PlaybackState::FadingIn {
            self.emit(PlayerEvent::PlaybackStateChanged {
                state: PlaybackState::FadingIn,
                timestamp: chrono::Utc::now(),
            });
        }

        let task = tokio::spawn(run_envelope(
            Arc::clone(&self.inner),
            self.events.clone(),
            self.settings,
            epoch,
        ));
        if let Some(fade) = inner.fade.as_mut() {
            fade.task = Some(task);
        }
    }

    /// Toggle pause/resume on the active channel.
    ///
    /// Resuming requests platform session activation before restarting the
    /// channel; pausing releases it afterwards. Session failures are logged
    /// and the reported pause state still follows user intent. The inactive
    /// channel and any in-flight envelope are left alone; a fade paused
    /// mid-flight has its clock frozen and resumes where it left off.
    pub fn toggle_pause(&self) {
        let mut inner = lock(&self.inner);
        let now = Instant::now();

        if inner.state == PlaybackState::Paused {
            if let Err(e) = self.session.set_active(true) {
                warn!("audio session activation failed: {}", e);
            }
            let active = inner.active;
            inner.channels[active].play();

            let resumed = if let Some(fade) = inner.fade.as_mut() {
                if let Some(paused_at) = fade.paused_at.take() {
                    fade.paused_total += now.duration_since(paused_at);
                }
                PlaybackState::FadingIn
            } else if inner.current_key.is_some() {
                PlaybackState::Steady
            } else {
                PlaybackState::Idle
            };
            inner.state = resumed;
            info!("playback resumed -> {:?}", resumed);
            self.emit(PlayerEvent::PlaybackStateChanged {
                state: resumed,
                timestamp: chrono::Utc::now(),
            });
        } else {
            let active = inner.active;
            inner.channels[active].pause();
            if let Err(e) = self.session.set_active(false) {
                warn!("audio session release failed: {}", e);
            }
            if let Some(fade) = inner.fade.as_mut() {
                fade.paused_at = Some(now);
            }
            inner.state = PlaybackState::Paused;
            info!("playback paused");
            self.emit(PlayerEvent::PlaybackStateChanged {
                state: PlaybackState::Paused,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Whether playback is currently paused.
    pub fn is_paused(&self) -> bool {
        lock(&self.inner).state == PlaybackState::Paused
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        lock(&self.inner).state
    }

    /// Source key of the most recently started track.
    pub fn current_key(&self) -> Option<String> {
        lock(&self.inner).current_key.clone()
    }

    /// Cancel any running envelope and pause both channels.
    ///
    /// Mandatory teardown path: prevents orphaned playback after the
    /// owning session goes away.
    pub fn shutdown(&self) {
        let mut inner = lock(&self.inner);
        inner.fade = None; // Fade::drop aborts the tick task
        for channel in inner.channels.iter() {
            channel.pause();
        }
        inner.state = PlaybackState::Idle;
        debug!("crossfade engine shut down");
    }

    fn emit(&self, event: PlayerEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }
}

impl Drop for CrossfadeEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Envelope tick task: applies the volume ramp at a fixed interval until
/// completion or supersession.
async fn run_envelope(
    inner: Arc<Mutex<EngineInner>>,
    events: broadcast::Sender<PlayerEvent>,
    settings: FadeSettings,
    epoch: u64,
) {
    let mut ticker = interval(settings.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let completed_key = {
            let mut inner = lock(&inner);

            let (fade_epoch, started, paused_total, frozen) = match inner.fade.as_ref() {
                Some(fade) => (
                    fade.epoch,
                    fade.started,
                    fade.paused_total,
                    fade.paused_at.is_some(),
                ),
                None => break,
            };
            if fade_epoch != epoch {
                // Superseded; the new envelope's task owns the channels now
                break;
            }
            if frozen || inner.state == PlaybackState::Paused {
                continue;
            }

            let elapsed = started
                .elapsed()
                .checked_sub(paused_total)
                .unwrap_or(Duration::ZERO);
            let t = envelope::progress(elapsed, settings.pre_roll, settings.duration);

            let outgoing = inner.active;
            let incoming = 1 - outgoing;
            inner.channels[outgoing].set_volume((1.0 - t) as f32);
            inner.channels[incoming].set_volume(t as f32);

            if t >= 1.0 {
                // Handover: silence and re-prime the outgoing channel, flip
                // the designator, settle.
                inner.channels[outgoing].pause();
                inner.channels[outgoing].set_volume(1.0);
                inner.active = incoming;
                inner.state = PlaybackState::Steady;
                inner.fade.take().map(|mut fade| {
                    // This task is the fade's own; don't abort ourselves
                    fade.task.take();
                    std::mem::take(&mut fade.source_key)
                })
            } else {
                None
            }
        };

        if let Some(source_key) = completed_key {
            info!("crossfade completed: {}", source_key);
            let _ = events.send(PlayerEvent::CrossfadeCompleted {
                source_key,
                timestamp: chrono::Utc::now(),
            });
            let _ = events.send(PlayerEvent::PlaybackStateChanged {
                state: PlaybackState::Steady,
                timestamp: chrono::Utc::now(),
            });
            break;
        }
    }
}
