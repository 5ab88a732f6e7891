//! System profiler for timing named systems across ticks

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Accumulated cost of one system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemTiming {
    pub total: Duration,
    pub calls: u64,
}

impl SystemTiming {
    /// Mean duration of a single invocation.
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            return Duration::ZERO;
        }
        self.total / self.calls as u32
    }
}

#[derive(Debug, Default)]
pub struct SystemProfiler {
    timings: BTreeMap<String, SystemTiming>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self {
            timings: BTreeMap::new(),
        }
    }

    /// Run `f`, charging its wall time to `name`.
    pub fn time_system<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        if !self.timings.contains_key(name) {
            self.timings.insert(name.to_owned(), SystemTiming::default());
        }
        if let Some(timing) = self.timings.get_mut(name) {
            timing.total += elapsed;
            timing.calls += 1;
        }
        result
    }

    pub fn timing(&self, name: &str) -> SystemTiming {
        self.timings.get(name).copied().unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SystemTiming)> {
        self.timings
            .iter()
            .map(|(name, timing)| (name.as_str(), *timing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_system_counts_calls_and_returns_result() {
        let mut profiler = SystemProfiler::new();

        let a = profiler.time_system("physics", || 1 + 1);
        let b = profiler.time_system("physics", || 3);
        profiler.time_system("render", || ());

        assert_eq!((a, b), (2, 3));
        assert_eq!(profiler.timing("physics").calls, 2);
        assert_eq!(profiler.timing("render").calls, 1);
        assert_eq!(profiler.timing("unknown"), SystemTiming::default());
        assert_eq!(profiler.iter().count(), 2);

        profiler.reset();
        assert_eq!(profiler.iter().count(), 0);
    }

    #[test]
    fn test_average_of_unused_timing_is_zero() {
        assert_eq!(SystemTiming::default().average(), Duration::ZERO);

        let timing = SystemTiming {
            total: Duration::from_millis(30),
            calls: 3,
        };
        assert_eq!(timing.average(), Duration::from_millis(10));
    }
}
