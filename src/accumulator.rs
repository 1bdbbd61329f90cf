//! Running latency aggregates for a single operation
//!
//! One `TimingStats` holds the count, total, minimum and maximum of all
//! samples recorded for one operation since the last window reset. No
//! individual samples are retained; memory cost is constant per operation.

/// Running statistics for a single operation (microsecond resolution)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingStats {
    /// Number of samples recorded since the last reset
    count: u64,
    /// Sum of all sample durations (microseconds)
    total_us: u64,
    /// Smallest sample seen (meaningless while count == 0)
    min_us: u64,
    /// Largest sample seen (meaningless while count == 0)
    max_us: u64,
}

impl TimingStats {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample. A duration of zero is valid (sub-resolution call).
    pub fn record(&mut self, duration_us: u64) {
        if self.count == 0 {
            self.min_us = duration_us;
            self.max_us = duration_us;
        } else {
            self.min_us = self.min_us.min(duration_us);
            self.max_us = self.max_us.max(duration_us);
        }
        self.count += 1;
        self.total_us += duration_us;
    }

    /// True iff no sample has been recorded since creation or last reset
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of samples recorded
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of all sample durations (microseconds)
    pub fn total_us(&self) -> u64 {
        self.total_us
    }

    /// Smallest and largest sample, or None while empty
    pub fn min_max(&self) -> Option<(u64, u64)> {
        if self.count == 0 {
            None
        } else {
            Some((self.min_us, self.max_us))
        }
    }

    /// Average duration per call in microseconds, or None while empty
    pub fn average_us(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total_us as f64 / self.count as f64)
        }
    }

    /// True if min, max or average crosses the given threshold.
    ///
    /// Used for report highlighting; any of the three crossing flags the row.
    pub fn exceeds_threshold(&self, threshold_us: u64) -> bool {
        match self.min_max() {
            Some((min, max)) => {
                min > threshold_us
                    || max > threshold_us
                    || self.average_us().unwrap_or(0.0) > threshold_us as f64
            }
            None => false,
        }
    }
}
