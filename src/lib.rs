//! Opmeter - Lightweight windowed call-latency instrumentation
//!
//! This library records call-latency samples for named operations grouped
//! into categories, maintains constant-size running aggregates (count, min,
//! max, average) per operation, and produces point-in-time reports with
//! derived call-rate and duty-cycle metrics over a rolling measurement
//! window that resets on demand.
//!
//! Built for long-running, resource-constrained processes: no per-sample
//! allocation, no retained history, wraparound-tolerant clock arithmetic,
//! and one coarse lock for callers where recording and reporting race.
//!
//! # Example
//!
//! ```
//! use opmeter::{Category, NumericNames, OpId, TimingService};
//!
//! let mut timing = TimingService::new();
//! timing.record(Category::Plugin, OpId::composite(12, 1), 1_500);
//! let report = timing.build_report(true, &NumericNames);
//! assert_eq!(report.rows.len(), 1);
//! ```

pub mod accumulator;
pub mod names;
pub mod registry;
pub mod report;
pub mod service;
pub mod window;

pub use accumulator::TimingStats;
pub use names::{NameResolver, NumericNames};
pub use registry::{Category, OpId, StatsRegistry};
pub use report::{Report, ReportPolicy, ReportRow};
pub use service::{SharedTimingService, TimingService};
pub use window::{MeasurementWindow, MonotonicClock, SystemClock};
