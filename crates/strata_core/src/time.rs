//! Deterministic time system
//!
//! The world advances in discrete ticks; wall-clock time never enters the
//! simulation. Each tick also accounts for a fixed slice of simulated time so
//! hosts can convert tick counts to durations.

use std::time::Duration;

/// Discrete simulation step counter. Stamped onto every component write.
pub type Tick = u64;

/// Default simulation tick rate (60 Hz).
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Simulation time tracker
#[derive(Debug, Clone)]
pub struct SimulationClock {
    tick: Tick,
    tick_duration: Duration,
    elapsed: Duration,
}

impl SimulationClock {
    /// Clock at tick 0 advancing by `1 / tick_rate_hz` seconds per tick.
    ///
    /// A rate of zero is clamped to 1 Hz.
    pub fn new(tick_rate_hz: u32) -> Self {
        Self {
            tick: 0,
            tick_duration: Duration::from_secs(1) / tick_rate_hz.max(1),
            elapsed: Duration::ZERO,
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// Advance by exactly one tick and return the new tick number.
    pub fn advance_tick(&mut self) -> Tick {
        self.tick += 1;
        self.elapsed += self.tick_duration;
        self.tick
    }

    /// Simulated time covered by all completed ticks.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_HZ)
    }
}
