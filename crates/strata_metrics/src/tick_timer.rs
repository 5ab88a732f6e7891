//! Wall-clock timing of simulation ticks

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TickTimer {
    tick_start: Instant,
    tick_times: RingBuffer<Duration>,
}

impl TickTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            tick_start: Instant::now(),
            tick_times: RingBuffer::new(capacity),
        }
    }

    pub fn begin(&mut self) {
        self.tick_start = Instant::now();
    }

    pub fn end(&mut self) {
        let elapsed = self.tick_start.elapsed();
        self.tick_times.push(elapsed);
    }

    /// Ticks per second the pipeline could sustain at the current average cost.
    pub fn ticks_per_second(&self) -> f64 {
        let avg = self.tick_times.average();
        if avg.as_secs_f64() > 0.0 {
            1.0 / avg.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn tick_time_ms(&self) -> f64 {
        self.tick_times.average().as_secs_f64() * 1000.0
    }

    pub fn tick_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.tick_times.min_max();
        (min.as_secs_f64() * 1000.0, max.as_secs_f64() * 1000.0)
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unused_timer_reports_zero() {
        let timer = TickTimer::new(8);
        assert_eq!(timer.ticks_per_second(), 0.0);
        assert_eq!(timer.tick_time_range_ms(), (0.0, 0.0));
    }

    #[test]
    fn test_measured_tick_has_non_negative_range() {
        let mut timer = TickTimer::new(8);
        timer.begin();
        std::thread::sleep(Duration::from_millis(1));
        timer.end();

        let (min, max) = timer.tick_time_range_ms();
        assert!(min >= 1.0);
        assert!(max >= min);
        assert!(timer.ticks_per_second() > 0.0);
    }
}
