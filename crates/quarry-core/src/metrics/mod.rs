//! Per-search and per-batch performance tracking.

mod report;
mod tracker;

pub use tracker::{BatchMetrics, PerformanceTracker, SearchMetric};
