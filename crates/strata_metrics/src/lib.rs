//! Strata Metrics - instrumentation for the tick pipeline
//!
//! Per-system timings, named counters and rolling tick statistics. Everything
//! here vanishes in production builds via the `metrics` feature flag.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use strata_metrics::{SystemProfiler, TickTimer};
//!
//! let mut timer = TickTimer::new(120); // Track last 120 ticks
//! let mut profiler = SystemProfiler::new();
//! timer.begin();
//! profiler.time_system("movement", || step_movement());
//! timer.end();
//! println!("ticks/s: {:.1}", timer.ticks_per_second());
//! ```
//!
//! Without the `metrics` feature the same types exist as no-op stubs, so
//! callers never need their own `cfg` guards.

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod ring_buffer;
#[cfg(feature = "metrics")]
mod system_profiler;
#[cfg(feature = "metrics")]
mod tick_timer;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;
#[cfg(feature = "metrics")]
pub use system_profiler::{SystemProfiler, SystemTiming};
#[cfg(feature = "metrics")]
pub use tick_timer::TickTimer;

/// Whether this build collects metrics.
pub const ENABLED: bool = cfg!(feature = "metrics");

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct TickTimer;

#[cfg(not(feature = "metrics"))]
impl TickTimer {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn ticks_per_second(&self) -> f64 { 0.0 }
    pub fn tick_time_ms(&self) -> f64 { 0.0 }
    pub fn tick_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug)]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &str, _value: usize) {}
    pub fn set(&mut self, _name: &str, _value: usize) {}
    pub fn get(&self, _name: &str) -> usize { 0 }
    pub fn reset_all(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> { std::iter::empty() }
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemTiming {
    pub total: std::time::Duration,
    pub calls: u64,
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct SystemProfiler;

#[cfg(not(feature = "metrics"))]
impl SystemProfiler {
    pub fn new() -> Self { Self }
    pub fn time_system<F, R>(&mut self, _name: &str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn timing(&self, _name: &str) -> SystemTiming { SystemTiming::default() }
    pub fn reset(&mut self) {}
    pub fn iter(&self) -> impl Iterator<Item = (&str, SystemTiming)> { std::iter::empty() }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_api_is_identical_with_and_without_metrics() {
        let mut timer = super::TickTimer::new(60);
        timer.begin();
        timer.end();

        let mut counter = super::Counter::new();
        counter.increment("ticks", 1);

        let mut profiler = super::SystemProfiler::new();
        let value = profiler.time_system("noop", || 7);
        assert_eq!(value, 7);

        if super::ENABLED {
            assert_eq!(counter.get("ticks"), 1);
            assert_eq!(profiler.timing("noop").calls, 1);
        } else {
            assert_eq!(counter.get("ticks"), 0);
            assert_eq!(profiler.timing("noop").calls, 0);
        }
    }
}
