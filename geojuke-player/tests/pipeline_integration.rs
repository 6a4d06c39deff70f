//! Integration tests for the full playback pipeline
//!
//! Exercises the path a real deployment takes: a catalog JSON snapshot on
//! disk, background source resolution, a simulated walk delivered over the
//! HTTP location endpoint, and the status/pins surface reflecting what the
//! crossfade engine is doing. Audio output is stubbed with null channels;
//! the envelope timing itself is covered by the engine's own tests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower::util::ServiceExt;
use uuid::Uuid;

use geojuke_common::events::PlayerEvent;
use geojuke_player::api::{create_router, AppState};
use geojuke_player::catalog::Catalog;
use geojuke_player::jukebox::Jukebox;
use geojuke_player::playback::{CrossfadeEngine, FadeSettings, NullChannel, NullSession};

/// Two songs, two pins a city block apart, with local audio files that
/// exist on disk so resolution succeeds.
fn write_catalog(dir: &std::path::Path) -> (std::path::PathBuf, Uuid, Uuid) {
    let song1 = Uuid::new_v4();
    let song2 = Uuid::new_v4();

    let audio1 = dir.join("first.mp3");
    let audio2 = dir.join("second.mp3");
    std::fs::File::create(&audio1).unwrap();
    std::fs::File::create(&audio2).unwrap();

    let catalog = serde_json::json!({
        "songs": [
            {
                "id": song1,
                "title": "First",
                "artist": "A",
                "audio_url": audio1.to_string_lossy(),
                "bpm": 96.0
            },
            {
                "id": song2,
                "title": "Second",
                "artist": "B",
                "audio_url": audio2.to_string_lossy()
            }
        ],
        "pins": [
            { "id": Uuid::new_v4(), "latitude": 0.0, "longitude": 0.0, "song_id": song1 },
            { "id": Uuid::new_v4(), "latitude": 1.0, "longitude": 1.0, "song_id": song2 }
        ]
    });

    let path = dir.join("catalog.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(catalog.to_string().as_bytes()).unwrap();
    (path, song1, song2)
}

async fn setup(
    dir: &std::path::Path,
) -> (axum::Router, Arc<Jukebox>, broadcast::Receiver<PlayerEvent>) {
    let (catalog_path, _, _) = write_catalog(dir);
    let catalog = Arc::new(Catalog::from_file(&catalog_path).unwrap());

    let (events, rx) = broadcast::channel(64);
    Arc::clone(&catalog)
        .resolve_sources(dir.join("cache"), events.clone())
        .await;

    let engine = CrossfadeEngine::new(
        [Box::new(NullChannel), Box::new(NullChannel)],
        Arc::new(NullSession),
        FadeSettings {
            duration: Duration::from_millis(500),
            pre_roll: Duration::from_millis(100),
            tick: Duration::from_millis(30),
        },
        events.clone(),
    );
    let jukebox = Arc::new(Jukebox::new(catalog, engine, events));
    let router = create_router(AppState {
        jukebox: Arc::clone(&jukebox),
    });
    (router, jukebox, rx)
}

async fn post_location(app: &axum::Router, latitude: f64, longitude: f64) -> Value {
    let body = serde_json::json!({ "latitude": latitude, "longitude": longitude });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/location")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn get_json(app: &axum::Router, path: &str) -> Value {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_walk_drives_crossfades_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (app, jukebox, mut rx) = setup(dir.path()).await;

    // Both songs resolved from the local files before any location arrives
    let mut resolved = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, PlayerEvent::SourceResolved { .. }) {
            resolved += 1;
        }
    }
    assert_eq!(resolved, 2);

    // Arriving near the first pin starts a fade and pins the status to it
    let json = post_location(&app, 0.1, 0.1).await;
    let first_pin = json["active_pin"].as_str().unwrap().to_string();

    let status = get_json(&app, "/api/v1/status").await;
    assert_eq!(status["state"], "FadingIn");
    assert_eq!(status["song"]["title"], "First");
    assert_eq!(status["song"]["bpm"], 96.0);

    // Let the 500 ms envelope finish
    for _ in 0..30 {
        tokio::time::advance(Duration::from_millis(30)).await;
        tokio::task::yield_now().await;
    }
    let status = get_json(&app, "/api/v1/status").await;
    assert_eq!(status["state"], "Steady");

    // Lingering near the same pin never re-triggers
    post_location(&app, 0.12, 0.08).await;
    let status = get_json(&app, "/api/v1/status").await;
    assert_eq!(status["state"], "Steady");

    // Walking to the second pin starts the next fade
    let json = post_location(&app, 0.9, 0.9).await;
    assert_ne!(json["active_pin"].as_str().unwrap(), first_pin);
    let status = get_json(&app, "/api/v1/status").await;
    assert_eq!(status["state"], "FadingIn");
    assert_eq!(status["song"]["title"], "Second");

    jukebox.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_pause_survives_the_http_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (app, jukebox, _rx) = setup(dir.path()).await;

    post_location(&app, 0.1, 0.1).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/playback/toggle")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["is_paused"], true);

    let status = get_json(&app, "/api/v1/status").await;
    assert_eq!(status["state"], "Paused");
    assert!(jukebox.is_paused());

    // A new location while paused still changes the track and resumes
    post_location(&app, 0.9, 0.9).await;
    let status = get_json(&app, "/api/v1/status").await;
    assert_eq!(status["state"], "FadingIn");
    assert_eq!(status["is_paused"], false);

    jukebox.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_pins_and_events_surface_the_walk() {
    let dir = tempfile::tempdir().unwrap();
    let (app, jukebox, mut rx) = setup(dir.path()).await;
    while rx.try_recv().is_ok() {}

    let pins = get_json(&app, "/api/v1/pins").await;
    assert_eq!(pins.as_array().unwrap().len(), 2);

    post_location(&app, 0.1, 0.1).await;

    let mut saw_pin_change = false;
    let mut saw_request = false;
    let mut saw_fade_start = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            PlayerEvent::NearestPinChanged { pin_id, .. } => {
                assert!(pin_id.is_some());
                saw_pin_change = true;
            }
            PlayerEvent::TrackChangeRequested { .. } => saw_request = true,
            PlayerEvent::CrossfadeStarted { .. } => saw_fade_start = true,
            _ => {}
        }
    }
    assert!(saw_pin_change && saw_request && saw_fade_start);

    jukebox.shutdown();
}
