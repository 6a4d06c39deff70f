//! HTTP control surface for the player
//!
//! Thin interface layer over the jukebox: status for UI highlighting,
//! pause toggling, a location ingress endpoint, and an SSE event stream.
//! The engine itself knows nothing about HTTP.

use crate::jukebox::{Jukebox, Status};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
    routing::{get, post},
    Router,
};
use futures::stream::{Stream, StreamExt};
use geojuke_common::model::{Location, Pin};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jukebox: Arc<Jukebox>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/v1",
            Router::new()
                .route("/status", get(get_status))
                .route("/playback/toggle", post(toggle_pause))
                .route("/location", post(post_location))
                .route("/pins", get(get_pins))
                .route("/events", get(event_stream)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "geojuke-player",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/v1/status - playback state, pause flag, active pin and song
async fn get_status(State(state): State<AppState>) -> Json<Status> {
    Json(state.jukebox.status())
}

/// POST /api/v1/playback/toggle - pause/resume
async fn toggle_pause(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.jukebox.toggle_pause();
    Json(json!({ "is_paused": state.jukebox.is_paused() }))
}

/// POST /api/v1/location - feed one location sample into the pipeline
async fn post_location(
    State(state): State<AppState>,
    Json(location): Json<Location>,
) -> Json<serde_json::Value> {
    state.jukebox.handle_location(location);
    Json(json!({
        "status": "ok",
        "active_pin": state.jukebox.active_pin(),
    }))
}

/// GET /api/v1/pins - read-only pin list for map highlighting
async fn get_pins(State(state): State<AppState>) -> Json<Vec<Pin>> {
    Json(state.jukebox.catalog().pins().to_vec())
}

/// GET /api/v1/events - SSE event stream
async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("new SSE client connected");

    let rx = state.jukebox.subscribe_events();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.type_str()).data(json))),
                Err(e) => {
                    warn!("failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged or closed receiver
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
