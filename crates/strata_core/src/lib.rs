//! Strata Core
//!
//! Contains the simulation runtime:
//! - Entity Component System (typed pools, queries, command buffers)
//! - Six-phase system scheduler
//! - Deterministic tick clock
//! - World configuration

pub mod config;
pub mod ecs;
pub mod time;

pub use config::WorldConfig;
pub use time::{SimulationClock, Tick};

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
