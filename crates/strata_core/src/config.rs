//! World configuration

use crate::time::DEFAULT_TICK_RATE_HZ;
use serde::{Deserialize, Serialize};

/// Knobs applied when a [`World`](crate::ecs::World) is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Pre-register the Cleanup-phase system that destroys `Transient` entities.
    pub transient_cleanup: bool,
    /// Priority of the transient cleanup system. Lower runs first; the cleanup
    /// system goes after any other Cleanup system at the same priority.
    pub cleanup_priority: i32,
    /// Simulated ticks per second, used for [`SimulationClock`](crate::SimulationClock).
    pub tick_rate_hz: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            transient_cleanup: true,
            cleanup_priority: i32::MAX,
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
        }
    }
}

impl WorldConfig {
    /// Configuration with no pre-registered systems.
    pub fn bare() -> Self {
        Self {
            transient_cleanup: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: WorldConfig = serde_json::from_str(r#"{ "tick_rate_hz": 30 }"#).unwrap();
        assert_eq!(config.tick_rate_hz, 30);
        assert!(config.transient_cleanup);
        assert_eq!(config.cleanup_priority, i32::MAX);
    }

    #[test]
    fn bare_disables_cleanup_only() {
        let bare = WorldConfig::bare();
        assert!(!bare.transient_cleanup);
        assert_eq!(bare.tick_rate_hz, WorldConfig::default().tick_rate_hz);
    }
}
