//! Cumulative wall-clock timers for the solver phases.

use std::time::{Duration, Instant};

/// Accumulates wall-clock time over repeated start/stop measurements.
#[derive(Debug, Default)]
pub struct BenchmarkTimer {
    total: Duration,
    num_measurements: usize,
    start: Option<Instant>,
}

impl BenchmarkTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a measurement. A second call before `end_timer` restarts it.
    pub fn start_timer(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Finish the current measurement and add it to the total. A call
    /// without a matching `start_timer` is ignored.
    pub fn end_timer(&mut self) {
        if let Some(start) = self.start.take() {
            self.total += start.elapsed();
            self.num_measurements += 1;
        }
    }

    pub fn num_measurements(&self) -> usize {
        self.num_measurements
    }

    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1e3
    }

    /// Average milliseconds per measurement, zero before any measurement.
    pub fn average_ms(&self) -> f64 {
        if self.num_measurements == 0 {
            0.0
        } else {
            self.total_ms() / self.num_measurements as f64
        }
    }

    pub fn reset(&mut self) {
        self.total = Duration::ZERO;
        self.num_measurements = 0;
        self.start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_measurements() {
        let mut timer = BenchmarkTimer::new();
        timer.start_timer();
        timer.end_timer();
        timer.start_timer();
        timer.end_timer();
        assert_eq!(timer.num_measurements(), 2);
        assert!(timer.total_ms() >= 0.0);
    }

    #[test]
    fn end_without_start_is_ignored() {
        let mut timer = BenchmarkTimer::new();
        timer.end_timer();
        assert_eq!(timer.num_measurements(), 0);
        assert_eq!(timer.average_ms(), 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut timer = BenchmarkTimer::new();
        timer.start_timer();
        timer.end_timer();
        timer.reset();
        assert_eq!(timer.num_measurements(), 0);
        assert_eq!(timer.total_ms(), 0.0);
    }
}
