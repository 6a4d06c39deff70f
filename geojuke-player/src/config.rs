//! geojuke-player configuration
//!
//! TOML config file with serde defaults; every field is optional and the
//! file itself may be absent, in which case compiled defaults apply.

use crate::error::{Error, Result};
use crate::playback::envelope::FadeSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Crossfade timing configuration, all in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrossfadeConfig {
    pub duration_ms: u64,
    pub pre_roll_ms: u64,
    pub tick_ms: u64,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            duration_ms: 10_000,
            pre_roll_ms: 200,
            tick_ms: 30,
        }
    }
}

/// Player configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP bind address
    pub bind_addr: String,
    /// Directory for fetched remote audio sources
    pub cache_dir: PathBuf,
    pub crossfade: CrossfadeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5850".to_string(),
            cache_dir: PathBuf::from("cache"),
            crossfade: CrossfadeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("no config file given, using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn fade_settings(&self) -> FadeSettings {
        FadeSettings {
            duration: Duration::from_millis(self.crossfade.duration_ms),
            pre_roll: Duration::from_millis(self.crossfade.pre_roll_ms),
            tick: Duration::from_millis(self.crossfade.tick_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.crossfade.duration_ms, 10_000);
        assert_eq!(config.crossfade.pre_roll_ms, 200);
        assert_eq!(config.crossfade.tick_ms, 30);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"[crossfade]\nduration_ms = 4000\n").unwrap();

        let config = Config::load(Some(tmp.path())).unwrap();
        assert_eq!(config.crossfade.duration_ms, 4_000);
        assert_eq!(config.crossfade.pre_roll_ms, 200);
        assert_eq!(config.bind_addr, "0.0.0.0:5850");
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"crossfade = \"soon\"").unwrap();
        assert!(Config::load(Some(tmp.path())).is_err());
    }

    #[test]
    fn test_fade_settings_conversion() {
        let config = Config::default();
        let settings = config.fade_settings();
        assert_eq!(settings.duration, Duration::from_millis(10_000));
        assert_eq!(settings.pre_roll, Duration::from_millis(200));
        assert_eq!(settings.tick, Duration::from_millis(30));
    }
}
