//! Settings management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strata_core::WorldConfig;

/// Runtime settings, read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Number of ticks to simulate.
    pub ticks: u64,
    /// Sparks spawned by the demo every tick.
    pub spawn_per_tick: u32,
    pub world: WorldConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ticks: 600,
            spawn_per_tick: 4,
            world: WorldConfig::default(),
        }
    }
}

impl Settings {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{ "ticks": 10, "world": { "tick_rate_hz": 30 } }"#).unwrap();
        assert_eq!(settings.ticks, 10);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.world.tick_rate_hz, 30);
        assert!(settings.world.transient_cleanup);
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
        assert!(Settings::load(Some(Path::new("/definitely/not/here.json"))).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Settings::from_json("{ ticks: ").is_err());
    }
}
