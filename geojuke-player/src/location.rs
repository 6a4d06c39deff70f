//! Location sources
//!
//! The platform location stream is an external collaborator; this module
//! provides the two ways samples reach the pipeline: the HTTP endpoint
//! (see `api`) and the walk simulator below, which linearly interpolates
//! between waypoints at a fixed cadence for demos and integration runs.
//! Samples are delivered in order and each is processed to completion
//! before the next.

use crate::error::{Error, Result};
use crate::jukebox::Jukebox;
use geojuke_common::model::Location;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::time::interval;
use tracing::info;

fn default_step_ms() -> u64 {
    1_000
}

fn default_steps_per_leg() -> u32 {
    10
}

/// A simulated walk: straight legs between waypoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Walk {
    pub waypoints: Vec<Location>,
    /// Interval between emitted samples, matching a real location stream's
    /// ~1 s cadence by default
    #[serde(default = "default_step_ms")]
    pub step_ms: u64,
    #[serde(default = "default_steps_per_leg")]
    pub steps_per_leg: u32,
}

impl Walk {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read walk file {}: {e}", path.display())))?;
        let walk: Walk = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse walk file {}: {e}", path.display())))?;
        if walk.waypoints.is_empty() {
            return Err(Error::Config("walk file has no waypoints".to_string()));
        }
        Ok(walk)
    }

    /// All samples of the walk, in emission order.
    fn samples(&self) -> Vec<Location> {
        let mut samples = vec![self.waypoints[0]];
        for leg in self.waypoints.windows(2) {
            let (from, to) = (leg[0], leg[1]);
            let steps = self.steps_per_leg.max(1);
            for step in 1..=steps {
                let f = step as f64 / steps as f64;
                samples.push(Location::new(
                    from.latitude + (to.latitude - from.latitude) * f,
                    from.longitude + (to.longitude - from.longitude) * f,
                ));
            }
        }
        samples
    }
}

/// Feed a simulated walk into the jukebox, one sample per tick.
pub async fn run_walk(walk: Walk, jukebox: Arc<Jukebox>) {
    let samples = walk.samples();
    info!(
        "starting simulated walk: {} samples every {} ms",
        samples.len(),
        walk.step_ms
    );

    let mut ticker = interval(std::time::Duration::from_millis(walk.step_ms));
    for location in samples {
        ticker.tick().await;
        jukebox.handle_location(location);
    }
    info!("simulated walk finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_samples_interpolate_each_leg() {
        let walk = Walk {
            waypoints: vec![Location::new(0.0, 0.0), Location::new(1.0, 0.0)],
            step_ms: 100,
            steps_per_leg: 4,
        };

        let samples = walk.samples();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0], Location::new(0.0, 0.0));
        assert_eq!(samples[2], Location::new(0.5, 0.0));
        assert_eq!(samples[4], Location::new(1.0, 0.0));
    }

    #[test]
    fn test_from_file_rejects_empty_walk() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(br#"{"waypoints": []}"#).unwrap();
        assert!(Walk::from_file(tmp.path()).is_err());
    }

    #[test]
    fn test_from_file_applies_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(br#"{"waypoints": [{"latitude": 0.5, "longitude": -0.5}]}"#)
            .unwrap();

        let walk = Walk::from_file(tmp.path()).unwrap();
        assert_eq!(walk.step_ms, 1_000);
        assert_eq!(walk.steps_per_leg, 10);
    }
}
