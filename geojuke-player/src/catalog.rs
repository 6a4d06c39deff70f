//! Read-only pin/song catalog
//!
//! The Rust-facing boundary to the external catalog store: a JSON snapshot
//! of songs and pins, loaded once and never mutated by the playback
//! pipeline. Audio sources resolve lazily (a song's `audio_url` may point
//! at a remote object that still has to be fetched) and the selector
//! simply sees no source until resolution completes, retrying naturally on
//! the next location update.

use crate::error::{Error, Result};
use geojuke_common::events::PlayerEvent;
use geojuke_common::model::{AudioSource, CatalogFile, Pin, Song};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// In-memory catalog with lazily resolved audio sources.
pub struct Catalog {
    songs: HashMap<Uuid, Song>,
    /// Pins in file order; iteration order is the documented tie-break
    pins: Vec<Pin>,
    /// Song id → locally playable source, filled in as resolution completes
    resolved: RwLock<HashMap<Uuid, AudioSource>>,
}

impl Catalog {
    pub fn new(songs: Vec<Song>, pins: Vec<Pin>) -> Self {
        Self {
            songs: songs.into_iter().map(|s| (s.id, s)).collect(),
            pins,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Load a catalog snapshot from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = CatalogFile::load(path)?;
        info!(
            "catalog loaded: {} songs, {} pins",
            file.songs.len(),
            file.pins.len()
        );
        Ok(Self::new(file.songs, file.pins))
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn song(&self, id: Uuid) -> Option<&Song> {
        self.songs.get(&id)
    }

    /// Resolved audio source for a song, if resolution has completed.
    pub fn resolved_source(&self, song_id: Uuid) -> Option<AudioSource> {
        self.resolved
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&song_id)
            .cloned()
    }

    /// Record a resolved source. Also used by tests to pre-seed resolution.
    pub fn insert_resolved(&self, song_id: Uuid, source: AudioSource) {
        self.resolved
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(song_id, source);
    }

    /// Resolve every song's audio source in the background.
    ///
    /// Local paths resolve immediately; http(s) URLs are fetched into
    /// `cache_dir`. Failures are logged and skipped; the affected song
    /// just stays unresolved and the selector never triggers it.
    pub async fn resolve_sources(
        self: Arc<Self>,
        cache_dir: std::path::PathBuf,
        events: broadcast::Sender<PlayerEvent>,
    ) {
        if let Err(e) = tokio::fs::create_dir_all(&cache_dir).await {
            warn!("cannot create source cache {}: {e}", cache_dir.display());
            return;
        }

        let songs: Vec<(Uuid, String)> = self
            .songs
            .values()
            .filter_map(|s| s.audio_url.clone().map(|url| (s.id, url)))
            .collect();

        for (song_id, url) in songs {
            if self.resolved_source(song_id).is_some() {
                continue;
            }
            match resolve_one(&url, song_id, &cache_dir).await {
                Ok(source) => {
                    debug!("source resolved for {song_id}: {source}");
                    self.insert_resolved(song_id, source);
                    let _ = events.send(PlayerEvent::SourceResolved {
                        song_id,
                        timestamp: chrono::Utc::now(),
                    });
                }
                Err(e) => warn!("source resolution failed for {song_id}: {e}"),
            }
        }
    }
}

/// Turn one `audio_url` into a locally playable source.
async fn resolve_one(url: &str, song_id: Uuid, cache_dir: &Path) -> Result<AudioSource> {
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = reqwest::get(url)
            .await
            .map_err(|e| Error::Catalog(format!("fetch {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Catalog(format!("fetch {url}: {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Catalog(format!("fetch {url}: {e}")))?;

        let file_name = match source_extension(url) {
            Some(ext) => format!("{song_id}.{ext}"),
            None => song_id.to_string(),
        };
        let path = cache_dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        Ok(AudioSource(path.to_string_lossy().into_owned()))
    } else {
        // Local path: only resolves once the file actually exists
        let path = Path::new(url);
        if path.exists() {
            Ok(AudioSource(url.to_string()))
        } else {
            Err(Error::Catalog(format!("no such file: {url}")))
        }
    }
}

/// Audio file extension from a URL's path component, ignoring any query
/// string or fragment.
fn source_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 4 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
}
