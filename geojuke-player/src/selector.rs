//! Track selection and trigger deduplication
//!
//! Location updates far outnumber nearest-pin changes, so most resolutions
//! land on the pin that is already playing. The selector is the dedup
//! guard between the proximity resolver and the crossfade engine: it emits
//! a track-change request only when the resolved pin's song has a ready
//! audio source whose key differs from the last one triggered.

use crate::catalog::Catalog;
use geojuke_common::model::{AudioSource, NearestResolution};
use tracing::debug;
use uuid::Uuid;

/// A request to crossfade to a new track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackChange {
    pub pin_id: Uuid,
    pub song_id: Uuid,
    pub source: AudioSource,
}

/// Stateful dedup guard over nearest-pin resolutions.
#[derive(Debug, Default)]
pub struct TrackSelector {
    /// Source key of the last emitted request. Recorded at emission time,
    /// not at fade completion, so a rapid burst of updates during an
    /// in-flight fade cannot re-trigger the same target.
    last_key: Option<String>,
}

impl TrackSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `resolution` warrants a new track-change request.
    ///
    /// Emits iff the pin's song has a resolved audio source that differs
    /// from the last triggered key. An absent or still-resolving source
    /// emits nothing and leaves the last key untouched, so the same pin
    /// retries automatically once its source becomes available.
    pub fn select(
        &mut self,
        resolution: &NearestResolution,
        catalog: &Catalog,
    ) -> Option<TrackChange> {
        let song = match catalog.song(resolution.pin.song_id) {
            Some(song) => song,
            None => {
                debug!(
                    "pin {} references unknown song {}",
                    resolution.pin.id, resolution.pin.song_id
                );
                return None;
            }
        };

        let source = catalog.resolved_source(song.id)?;
        if self.last_key.as_deref() == Some(source.key()) {
            return None;
        }

        self.last_key = Some(source.key().to_string());
        Some(TrackChange {
            pin_id: resolution.pin.id,
            song_id: song.id,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojuke_common::model::{Pin, Song};

    fn fixture() -> (Catalog, NearestResolution, Uuid) {
        let song_id = Uuid::new_v4();
        let song = Song {
            id: song_id,
            title: "First".to_string(),
            artist: "A".to_string(),
            album: None,
            audio_url: Some("tracks/first.mp3".to_string()),
            bpm: Some(120.0),
        };
        let pin = Pin {
            id: Uuid::new_v4(),
            latitude: 0.0,
            longitude: 0.0,
            comment: None,
            song_id,
        };
        let resolution = NearestResolution {
            pin: pin.clone(),
            squared_distance: 0.02,
        };
        (Catalog::new(vec![song], vec![pin]), resolution, song_id)
    }

    #[test]
    fn test_emits_once_for_repeated_resolutions() {
        let (catalog, resolution, song_id) = fixture();
        catalog.insert_resolved(song_id, AudioSource::from("tracks/first.mp3"));
        let mut selector = TrackSelector::new();

        let first = selector.select(&resolution, &catalog);
        assert!(first.is_some());
        assert_eq!(first.unwrap().source, AudioSource::from("tracks/first.mp3"));

        // The common case: the same nearest pin, over and over
        for _ in 0..10 {
            assert!(selector.select(&resolution, &catalog).is_none());
        }
    }

    #[test]
    fn test_unresolved_source_emits_nothing_then_retries() {
        let (catalog, resolution, song_id) = fixture();
        let mut selector = TrackSelector::new();

        // Source not resolved yet: no request, no key update
        assert!(selector.select(&resolution, &catalog).is_none());
        assert!(selector.select(&resolution, &catalog).is_none());

        // Resolution completes; the very next select fires
        catalog.insert_resolved(song_id, AudioSource::from("tracks/first.mp3"));
        assert!(selector.select(&resolution, &catalog).is_some());
    }

    #[test]
    fn test_unknown_song_emits_nothing() {
        let (catalog, mut resolution, _) = fixture();
        resolution.pin.song_id = Uuid::new_v4();
        let mut selector = TrackSelector::new();
        assert!(selector.select(&resolution, &catalog).is_none());
    }

    #[test]
    fn test_distinct_sources_emit_distinct_requests() {
        let song_a = Uuid::new_v4();
        let song_b = Uuid::new_v4();
        let songs = vec![
            Song {
                id: song_a,
                title: "First".into(),
                artist: "A".into(),
                album: None,
                audio_url: None,
                bpm: None,
            },
            Song {
                id: song_b,
                title: "Second".into(),
                artist: "B".into(),
                album: None,
                audio_url: None,
                bpm: None,
            },
        ];
        let pin_a = Pin {
            id: Uuid::new_v4(),
            latitude: 0.0,
            longitude: 0.0,
            comment: None,
            song_id: song_a,
        };
        let pin_b = Pin {
            id: Uuid::new_v4(),
            latitude: 1.0,
            longitude: 1.0,
            comment: None,
            song_id: song_b,
        };
        let catalog = Catalog::new(songs, vec![pin_a.clone(), pin_b.clone()]);
        catalog.insert_resolved(song_a, AudioSource::from("tracks/a.mp3"));
        catalog.insert_resolved(song_b, AudioSource::from("tracks/b.mp3"));

        let mut selector = TrackSelector::new();
        let first = selector
            .select(
                &NearestResolution {
                    pin: pin_a,
                    squared_distance: 0.0,
                },
                &catalog,
            )
            .unwrap();
        let second = selector
            .select(
                &NearestResolution {
                    pin: pin_b,
                    squared_distance: 0.0,
                },
                &catalog,
            )
            .unwrap();

        assert_ne!(first.source, second.source);
    }
}
