//! Report rows and derived metrics
//!
//! A report is a point-in-time snapshot of every non-empty accumulator,
//! decorated with the derived metrics operators actually read: call rate,
//! duty cycle (fraction of wall-clock time the operation occupies), and the
//! classification flags the presentation layer uses for emphasis.

use serde::Serialize;

use crate::names::{fallback_label, NameResolver};
use crate::registry::{Category, OpId, StatsRegistry};

/// Classification policy for report rows.
///
/// The defaults carry the reference constants (100 ms highlight threshold,
/// 1 ms duty-reliability floor, 10% hot floor); deployments with different
/// sensitivity override them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportPolicy {
    /// A row is highlighted when min, max or average exceeds this (µs)
    pub threshold_us: u64,
    /// Duty figures from averages below this are flagged unreliable (µs)
    pub reliability_floor_us: f64,
    /// Duty percentage above which a row is flagged hot
    pub hot_duty_percent: f64,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            threshold_us: 100_000,
            reliability_floor_us: 1_000.0,
            hot_duty_percent: 10.0,
        }
    }
}

/// One operation's aggregates and derived metrics
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    /// Category the operation belongs to
    pub category: Category,
    /// Resolved category label
    pub category_label: String,
    /// Operation identifier
    pub op: OpId,
    /// Resolved operation label (numeric fallback when unresolvable)
    pub op_label: String,
    /// Samples recorded in the window
    pub count: u64,
    /// Calls per second over the window (0.0 when elapsed is zero)
    pub calls_per_sec: f64,
    /// Average duration per call (µs)
    pub avg_us: f64,
    /// Smallest sample (µs)
    pub min_us: u64,
    /// Largest sample (µs)
    pub max_us: u64,
    /// Percentage of wall-clock time spent in this operation
    pub duty_percent: f64,
    /// Duty figure derived from a sub-millisecond average; still emitted,
    /// only flagged for annotation
    pub duty_unreliable: bool,
    /// Duty above the hot floor
    pub duty_hot: bool,
    /// Min, max or average crossed the highlight threshold
    pub threshold_exceeded: bool,
}

/// Snapshot of all categories over one measurement window
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Rows in category order, key-sorted within each category
    pub rows: Vec<ReportRow>,
    /// Window length the rows were measured over (µs)
    pub elapsed_us: u64,
}

impl Report {
    /// Serialize the report to a JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Print a plain-text summary table to stderr
    pub fn print_summary(&self) {
        if self.rows.is_empty() {
            eprintln!("No timing samples recorded.");
            return;
        }

        let elapsed_secs = self.elapsed_us as f64 / 1_000_000.0;
        eprintln!("Timing statistics over {:.3}s window", elapsed_secs);
        eprintln!(
            "{:<12} {:<24} {:>9} {:>9} {:>8} {:>10} {:>10} {:>10}",
            "Category", "Operation", "calls", "call/sec", "duty(%)", "min(ms)", "avg(ms)", "max(ms)"
        );
        eprintln!("{}", "-".repeat(98));

        for row in &self.rows {
            let duty = if row.duty_unreliable {
                // Sub-millisecond averages make the duty figure unreliable
                format!("{:.2}*", row.duty_percent)
            } else {
                format!("{:.2}", row.duty_percent)
            };
            let marker = if row.threshold_exceeded || row.duty_hot {
                "!"
            } else {
                " "
            };
            eprintln!(
                "{marker}{:<11} {:<24} {:>9} {:>9.2} {:>8} {:>10.3} {:>10.3} {:>10.3}",
                row.category_label,
                row.op_label,
                row.count,
                row.calls_per_sec,
                duty,
                row.min_us as f64 / 1_000.0,
                row.avg_us / 1_000.0,
                row.max_us as f64 / 1_000.0,
            );
        }
        eprintln!("{}", "-".repeat(98));
        eprintln!("* duty cycle based on average < 1 msec is highly unreliable");
    }
}

/// Build report rows from a registry snapshot.
///
/// `elapsed_us` must be sampled once by the caller before any clearing so
/// every row shares the same call-rate denominator.
pub(crate) fn build_rows(
    registry: &StatsRegistry,
    elapsed_us: u64,
    policy: &ReportPolicy,
    resolver: &dyn NameResolver,
) -> Vec<ReportRow> {
    let elapsed_secs = elapsed_us as f64 / 1_000_000.0;
    let mut rows = Vec::new();

    for category in Category::ALL {
        let category_label = resolver.category_label(category);
        for (op, stats) in registry.non_empty(category) {
            // Non-empty accumulators always carry observed min/max/avg
            let (min_us, max_us) = match stats.min_max() {
                Some(pair) => pair,
                None => continue,
            };
            let avg_us = stats.average_us().unwrap_or(0.0);

            let calls_per_sec = if elapsed_us == 0 {
                0.0
            } else {
                stats.count() as f64 / elapsed_secs
            };
            let duty_percent = calls_per_sec * avg_us / 10_000.0;
            let duty_unreliable = avg_us < policy.reliability_floor_us;
            let duty_hot = !duty_unreliable && duty_percent > policy.hot_duty_percent;

            rows.push(ReportRow {
                category,
                category_label: category_label.clone(),
                op,
                op_label: resolver
                    .operation_name(category, op)
                    .unwrap_or_else(|| fallback_label(op)),
                count: stats.count(),
                calls_per_sec,
                avg_us,
                min_us,
                max_us,
                duty_percent,
                duty_unreliable,
                duty_hot,
                threshold_exceeded: stats.exceeds_threshold(policy.threshold_us),
            });
        }
    }

    rows
}
