//! Measurement window and monotonic time source
//!
//! The window defines the epoch all aggregates are valid over. Elapsed time
//! uses wrapping subtraction so a monotonic counter that has wrapped past its
//! maximum still yields the correct forward delta. This matters for
//! long-uptime targets whose raw tick counters roll over.

use std::time::Instant;

/// Monotonic time source, microsecond resolution.
///
/// `now_micros` may wrap; consumers must treat deltas with modular
/// arithmetic. Implemented by test clocks to make time deterministic.
pub trait MonotonicClock {
    /// Current monotonic timestamp in microseconds
    fn now_micros(&self) -> u64;
}

/// Default clock backed by `std::time::Instant`
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Clock whose timestamps count from now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Tracks the start of the current measurement epoch
#[derive(Debug, Clone, Copy)]
pub struct MeasurementWindow {
    epoch_start_us: u64,
}

impl MeasurementWindow {
    /// Start a window at `now_us`
    pub fn new(now_us: u64) -> Self {
        Self {
            epoch_start_us: now_us,
        }
    }

    /// Timestamp of the last reset
    pub fn epoch_start_micros(&self) -> u64 {
        self.epoch_start_us
    }

    /// Time since the last reset.
    ///
    /// Wrapping subtraction: correct even when the raw counter has wrapped
    /// past its maximum between reset and now.
    pub fn elapsed_micros(&self, now_us: u64) -> u64 {
        now_us.wrapping_sub(self.epoch_start_us)
    }

    /// Move the epoch to `now_us`
    pub fn reset(&mut self, now_us: u64) {
        self.epoch_start_us = now_us;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_from_fixed_epoch() {
        let window = MeasurementWindow::new(1_000);
        assert_eq!(window.elapsed_micros(1_000), 0);
        assert_eq!(window.elapsed_micros(5_500), 4_500);
    }

    #[test]
    fn test_reset_moves_epoch_forward() {
        let mut window = MeasurementWindow::new(0);
        window.reset(10_000);
        assert_eq!(window.epoch_start_micros(), 10_000);
        assert_eq!(window.elapsed_micros(10_250), 250);
    }

    #[test]
    fn test_elapsed_survives_counter_wraparound() {
        // Epoch 100 ticks before the counter wraps, now 50 ticks after
        let window = MeasurementWindow::new(u64::MAX - 99);
        assert_eq!(window.elapsed_micros(50), 150);
    }

    #[test]
    fn test_elapsed_at_exact_wrap_boundary() {
        let window = MeasurementWindow::new(u64::MAX);
        assert_eq!(window.elapsed_micros(u64::MAX), 0);
        assert_eq!(window.elapsed_micros(0), 1);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_micros();
        let b = clock.now_micros();
        assert!(b >= a);
    }
}
