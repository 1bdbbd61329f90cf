//! Owned instrumentation service
//!
//! `TimingService` ties the registry, measurement window, clock and policy
//! together as one explicitly constructed object: dependency-injected into
//! instrumented call sites and the reporting collaborator instead of living
//! as ambient global state. `SharedTimingService` wraps it in a single lock
//! for callers where recording and reporting can race.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::names::NameResolver;
use crate::registry::{Category, OpId, StatsRegistry};
use crate::report::{build_rows, Report, ReportPolicy};
use crate::window::{MeasurementWindow, MonotonicClock, SystemClock};

/// Instrumentation service: three category registries sharing one window.
///
/// Single logical thread of control; use [`SharedTimingService`] when
/// recording and reporting run on different threads.
#[derive(Debug)]
pub struct TimingService<C: MonotonicClock = SystemClock> {
    registry: StatsRegistry,
    window: MeasurementWindow,
    policy: ReportPolicy,
    clock: C,
}

impl TimingService<SystemClock> {
    /// Service with the system clock and default policy, epoch starting now
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new(), ReportPolicy::default())
    }
}

impl Default for TimingService<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: MonotonicClock> TimingService<C> {
    /// Service with an injected clock and policy, epoch starting at the
    /// clock's current time
    pub fn with_clock(clock: C, policy: ReportPolicy) -> Self {
        let window = MeasurementWindow::new(clock.now_micros());
        Self {
            registry: StatsRegistry::new(),
            window,
            policy,
            clock,
        }
    }

    /// Record one sample for `(category, id)`
    pub fn record(&mut self, category: Category, id: OpId, duration_us: u64) {
        self.registry.record(category, id, duration_us);
    }

    /// Measure a closure with the service clock and record its duration
    pub fn time<F, R>(&mut self, category: Category, id: OpId, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = self.clock.now_micros();
        let result = f();
        let duration_us = self.clock.now_micros().wrapping_sub(start);
        self.record(category, id, duration_us);
        result
    }

    /// True iff no category holds any accumulator
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Classification policy in effect
    pub fn policy(&self) -> &ReportPolicy {
        &self.policy
    }

    /// Time since the last reset
    pub fn elapsed_micros(&self) -> u64 {
        self.window.elapsed_micros(self.clock.now_micros())
    }

    /// Restart the measurement epoch, dropping all accumulators
    pub fn reset(&mut self) {
        let now = self.clock.now_micros();
        self.registry.clear_all();
        self.window.reset(now);
        tracing::debug!(epoch_start_us = now, "timing window reset");
    }

    /// Build a snapshot of every non-empty accumulator.
    ///
    /// `now` is sampled once at entry; the elapsed value is computed before
    /// any clearing so every row's call rate shares the same denominator.
    /// With `clear_after`, all registries are cleared and the epoch moves to
    /// that same `now`, so no sample is dropped or double-counted across the
    /// boundary.
    pub fn build_report(&mut self, clear_after: bool, resolver: &dyn NameResolver) -> Report {
        let now = self.clock.now_micros();
        let elapsed_us = self.window.elapsed_micros(now);
        let rows = build_rows(&self.registry, elapsed_us, &self.policy, resolver);

        if clear_after {
            self.registry.clear_all();
            self.window.reset(now);
        }
        tracing::debug!(
            rows = rows.len(),
            elapsed_us,
            clear_after,
            "timing report built"
        );

        Report { rows, elapsed_us }
    }
}

/// Thread-safe handle around [`TimingService`].
///
/// One mutex covers all registries and the window epoch together, so a
/// report always reflects a consistent snapshot even when another thread is
/// recording. Every operation holds the lock for bounded arithmetic only.
#[derive(Debug)]
pub struct SharedTimingService<C: MonotonicClock = SystemClock> {
    inner: Arc<Mutex<TimingService<C>>>,
}

impl<C: MonotonicClock> Clone for SharedTimingService<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedTimingService<SystemClock> {
    /// Shared service with the system clock and default policy
    pub fn new() -> Self {
        Self::from_service(TimingService::new())
    }
}

impl Default for SharedTimingService<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: MonotonicClock> SharedTimingService<C> {
    /// Wrap an already-constructed service
    pub fn from_service(service: TimingService<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Record one sample for `(category, id)`
    pub fn record(&self, category: Category, id: OpId, duration_us: u64) {
        self.inner.lock().record(category, id, duration_us);
    }

    /// Measure a closure and record its duration.
    ///
    /// The lock is held only for the record, not while `f` runs.
    pub fn time<F, R>(&self, category: Category, id: OpId, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = self.inner.lock().clock.now_micros();
        let result = f();
        let mut service = self.inner.lock();
        let duration_us = service.clock.now_micros().wrapping_sub(start);
        service.record(category, id, duration_us);
        result
    }

    /// True iff no category holds any accumulator
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Restart the measurement epoch, dropping all accumulators
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Build a snapshot; see [`TimingService::build_report`]
    pub fn build_report(&self, clear_after: bool, resolver: &dyn NameResolver) -> Report {
        self.inner.lock().build_report(clear_after, resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::NumericNames;
    use std::cell::Cell;

    /// Deterministic clock advanced by hand from tests
    #[derive(Debug, Default)]
    struct ManualClock {
        now_us: Cell<u64>,
    }

    impl ManualClock {
        fn at(now_us: u64) -> Self {
            Self {
                now_us: Cell::new(now_us),
            }
        }

        fn advance(&self, delta_us: u64) {
            self.now_us.set(self.now_us.get().wrapping_add(delta_us));
        }
    }

    impl MonotonicClock for ManualClock {
        fn now_micros(&self) -> u64 {
            self.now_us.get()
        }
    }

    impl MonotonicClock for &ManualClock {
        fn now_micros(&self) -> u64 {
            self.now_us.get()
        }
    }

    #[test]
    fn test_new_service_is_empty() {
        let service = TimingService::new();
        assert!(service.is_empty());
    }

    #[test]
    fn test_record_and_report() {
        let clock = ManualClock::at(0);
        let mut service = TimingService::with_clock(&clock, ReportPolicy::default());

        service.record(Category::Plugin, OpId::composite(1, 2), 100);
        clock.advance(1_000_000);

        let report = service.build_report(false, &NumericNames);
        assert_eq!(report.elapsed_us, 1_000_000);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].count, 1);
    }

    #[test]
    fn test_clear_after_restarts_epoch() {
        let clock = ManualClock::at(0);
        let mut service = TimingService::with_clock(&clock, ReportPolicy::default());

        service.record(Category::Misc, OpId::new(1), 50);
        clock.advance(2_000_000);
        let first = service.build_report(true, &NumericNames);
        assert_eq!(first.rows.len(), 1);
        assert_eq!(first.elapsed_us, 2_000_000);

        // Immediately after a clearing report: nothing left, epoch restarted
        let second = service.build_report(false, &NumericNames);
        assert_eq!(second.rows.len(), 0);
        assert_eq!(second.elapsed_us, 0);
    }

    #[test]
    fn test_report_without_clear_keeps_accumulators() {
        let clock = ManualClock::at(0);
        let mut service = TimingService::with_clock(&clock, ReportPolicy::default());

        service.record(Category::Misc, OpId::new(1), 50);
        clock.advance(1_000_000);
        service.build_report(false, &NumericNames);

        assert!(!service.is_empty());
    }

    #[test]
    fn test_reset_drops_samples_and_epoch() {
        let clock = ManualClock::at(0);
        let mut service = TimingService::with_clock(&clock, ReportPolicy::default());

        service.record(Category::Controller, OpId::new(9), 10);
        clock.advance(5_000);
        service.reset();

        assert!(service.is_empty());
        assert_eq!(service.elapsed_micros(), 0);
        let report = service.build_report(false, &NumericNames);
        assert_eq!(report.rows.len(), 0);
        assert_eq!(report.elapsed_us, 0);
    }

    #[test]
    fn test_time_measures_closure_with_service_clock() {
        let clock = ManualClock::at(100);
        let mut service = TimingService::with_clock(&clock, ReportPolicy::default());

        let value = service.time(Category::Misc, OpId::new(3), || {
            clock.advance(750);
            42
        });

        assert_eq!(value, 42);
        let report = service.build_report(false, &NumericNames);
        assert_eq!(report.rows[0].count, 1);
        assert_eq!(report.rows[0].min_us, 750);
        assert_eq!(report.rows[0].max_us, 750);
    }

    #[test]
    fn test_elapsed_with_wrapped_clock() {
        let clock = ManualClock::at(u64::MAX - 10);
        let mut service = TimingService::with_clock(&clock, ReportPolicy::default());

        clock.advance(30); // wraps past u64::MAX
        assert_eq!(service.elapsed_micros(), 30);

        let report = service.build_report(false, &NumericNames);
        assert_eq!(report.elapsed_us, 30);
    }

    #[test]
    fn test_empty_system_reports_zero_rows_with_full_elapsed() {
        let clock = ManualClock::at(0);
        let mut service = TimingService::with_clock(&clock, ReportPolicy::default());

        clock.advance(3_000_000);
        let report = service.build_report(false, &NumericNames);
        assert_eq!(report.rows.len(), 0);
        assert_eq!(report.elapsed_us, 3_000_000);
    }

    #[test]
    fn test_shared_service_records_across_clones() {
        let shared = SharedTimingService::new();
        let other = shared.clone();

        shared.record(Category::Plugin, OpId::new(1), 100);
        other.record(Category::Plugin, OpId::new(1), 200);

        let report = shared.build_report(false, &NumericNames);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].count, 2);
    }

    #[test]
    fn test_shared_service_time_and_reset() {
        let shared = SharedTimingService::new();
        let value = shared.time(Category::Misc, OpId::new(1), || 7);
        assert_eq!(value, 7);
        assert!(!shared.is_empty());

        shared.reset();
        assert!(shared.is_empty());
    }
}
