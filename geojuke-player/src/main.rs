//! GeoJuke Player - main entry point
//!
//! Wires the pieces together: catalog load, background source resolution,
//! crossfade engine over the rodio backend (or null channels for headless
//! runs), optional walk simulation, and the HTTP/SSE control surface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geojuke_player::api::{self, AppState};
use geojuke_player::audio::AudioBackend;
use geojuke_player::catalog::Catalog;
use geojuke_player::config::Config;
use geojuke_player::jukebox::Jukebox;
use geojuke_player::location::{run_walk, Walk};
use geojuke_player::playback::{CrossfadeEngine, NullChannel, NullSession};

/// Command-line arguments for geojuke-player
#[derive(Parser, Debug)]
#[command(name = "geojuke-player")]
#[command(about = "Location-aware crossfade jukebox player")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "GEOJUKE_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the JSON pin/song catalog
    #[arg(long, env = "GEOJUKE_CATALOG")]
    catalog: PathBuf,

    /// Path to a JSON walk file to simulate a location stream
    #[arg(long)]
    walk: Option<PathBuf>,

    /// Override the configured HTTP bind address
    #[arg(short, long, env = "GEOJUKE_BIND")]
    bind: Option<String>,

    /// Run without an audio device (locations and state only)
    #[arg(long)]
    no_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geojuke_player=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(bind) = args.bind.clone() {
        config.bind_addr = bind;
    }

    info!("Starting GeoJuke Player on {}", config.bind_addr);

    let catalog =
        Arc::new(Catalog::from_file(&args.catalog).context("Failed to load catalog")?);

    let (events, _) = tokio::sync::broadcast::channel(100);

    // Resolve audio sources in the background; songs become playable as
    // their sources land
    tokio::spawn(
        Arc::clone(&catalog).resolve_sources(config.cache_dir.clone(), events.clone()),
    );

    // Keep the backend handle alive for the whole session; dropping it
    // stops the audio thread
    let mut audio_backend = None;
    let channels: [Box<dyn geojuke_player::playback::Channel>; 2] = if args.no_audio {
        info!("running with null audio channels");
        [Box::new(NullChannel), Box::new(NullChannel)]
    } else {
        let backend = AudioBackend::start().context("Failed to start audio output")?;
        let channels = backend.channels();
        audio_backend = Some(backend);
        channels
    };

    let engine = CrossfadeEngine::new(
        channels,
        Arc::new(NullSession),
        config.fade_settings(),
        events.clone(),
    );
    let jukebox = Arc::new(Jukebox::new(Arc::clone(&catalog), engine, events));
    info!("Playback pipeline initialized");

    if let Some(walk_path) = args.walk.as_deref() {
        let walk = Walk::from_file(walk_path).context("Failed to load walk file")?;
        tokio::spawn(run_walk(walk, Arc::clone(&jukebox)));
    }

    let app = api::create_router(AppState {
        jukebox: Arc::clone(&jukebox),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Mandatory teardown: cancel any running envelope, pause both channels
    jukebox.shutdown();
    drop(audio_backend);
    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
