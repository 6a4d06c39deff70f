//! Jukebox orchestration
//!
//! Binds the catalog, proximity resolver, track selector, and crossfade
//! engine into the one-directional pipeline: location sample → nearest pin
//! → (if changed) track-change request → crossfade. Each location update is
//! processed to completion before the next one is handled; the jukebox
//! never reorders or buffers samples.

use crate::catalog::Catalog;
use crate::playback::CrossfadeEngine;
use crate::selector::TrackSelector;
use geojuke_common::events::{PlaybackState, PlayerEvent};
use geojuke_common::geo::nearest_pin;
use geojuke_common::model::Location;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Status snapshot for the interface layer.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub state: PlaybackState,
    pub is_paused: bool,
    pub active_pin: Option<Uuid>,
    pub song: Option<StatusSong>,
}

/// Song metadata surfaced for UI display and pulse cadence.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSong {
    pub title: String,
    pub artist: String,
    pub bpm: Option<f64>,
}

/// One playback session: catalog + selector + crossfade engine.
pub struct Jukebox {
    catalog: Arc<Catalog>,
    engine: CrossfadeEngine,
    selector: Mutex<TrackSelector>,
    active_pin: Mutex<Option<Uuid>>,
    events: broadcast::Sender<PlayerEvent>,
}

impl Jukebox {
    pub fn new(
        catalog: Arc<Catalog>,
        engine: CrossfadeEngine,
        events: broadcast::Sender<PlayerEvent>,
    ) -> Self {
        Self {
            catalog,
            engine,
            selector: Mutex::new(TrackSelector::new()),
            active_pin: Mutex::new(None),
            events,
        }
    }

    /// Process one location sample through the pipeline.
    pub fn handle_location(&self, location: Location) {
        let resolution = nearest_pin(&location, self.catalog.pins());

        let new_pin = resolution.as_ref().map(|r| r.pin.id);
        {
            let mut active = self
                .active_pin
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if *active != new_pin {
                info!("nearest pin changed: {:?} -> {:?}", *active, new_pin);
                *active = new_pin;
                let _ = self.events.send(PlayerEvent::NearestPinChanged {
                    pin_id: new_pin,
                    squared_distance: resolution.as_ref().map(|r| r.squared_distance),
                    timestamp: chrono::Utc::now(),
                });
            }
        }

        let resolution = match resolution {
            Some(resolution) => resolution,
            // No pins in range of anything: a valid steady state
            None => return,
        };

        let change = self
            .selector
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .select(&resolution, &self.catalog);

        if let Some(change) = change {
            debug!(
                "track change: pin {} -> song {} ({})",
                change.pin_id, change.song_id, change.source
            );
            let _ = self.events.send(PlayerEvent::TrackChangeRequested {
                pin_id: change.pin_id,
                song_id: change.song_id,
                source_key: change.source.key().to_string(),
                timestamp: chrono::Utc::now(),
            });
            self.engine.crossfade_to(&change.source);
        }
    }

    /// Pin currently highlighted as nearest, for the interface layer.
    pub fn active_pin(&self) -> Option<Uuid> {
        *self
            .active_pin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn toggle_pause(&self) {
        self.engine.toggle_pause();
    }

    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Status snapshot for the control surface.
    pub fn status(&self) -> Status {
        let active_pin = self.active_pin();
        let song = active_pin
            .and_then(|pin_id| self.catalog.pins().iter().find(|p| p.id == pin_id))
            .and_then(|pin| self.catalog.song(pin.song_id))
            .map(|song| StatusSong {
                title: song.title.clone(),
                artist: song.artist.clone(),
                bpm: song.bpm,
            });
        Status {
            state: self.engine.state(),
            is_paused: self.engine.is_paused(),
            active_pin,
            song,
        }
    }

    /// Tear down playback: cancel any envelope, pause both channels.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}
