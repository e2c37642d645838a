//! Quarry Core - retry, pacing and metrics for batches of remote searches.
//!
//! Quarry issues many rate-limited searches against a single remote search
//! API and aggregates their results. It does not talk to the API itself:
//! callers plug in a [`Searcher`] and get back aggregated results plus a
//! performance report.
//!
//! # Architecture
//!
//! ```text
//! BatchExecutor → RetryExecutor(search) → ErrorClassifier
//!              → DelayScheduler (between searches)
//!              → PerformanceTracker (throughout) → BatchResult
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use quarry_core::{run_batch, CancellationToken, Config, PerformanceTracker, SearchTask};
//!
//! #[tokio::main]
//! async fn main() -> quarry_core::Result<()> {
//!     let config = Config::load()?;
//!     let searcher = MyApiSearcher::new();
//!     let tasks = vec![SearchTask::new("runtimes", "async runtime", 50)];
//!
//!     let mut tracker = PerformanceTracker::new();
//!     let cancel = CancellationToken::new();
//!     let output = run_batch(&config, &cancel, &searcher, &tasks, "runtimes", "", &mut tracker)
//!         .await?;
//!     println!("{} results", output.result.total_results);
//!     if let Some(report) = output.report {
//!         eprintln!("{report}");
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod batch;
pub mod config;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod schedule;
pub mod search;
pub mod types;
pub mod wait;

// Re-exports for convenient access
pub use batch::{run_batch, BatchExecutor, BatchOptions, BatchOutput, ReportMode};
pub use config::Config;
pub use error::{BatchError, ConfigError, QuarryError, Result, RetryError, SearchError};
pub use metrics::{BatchMetrics, PerformanceTracker, SearchMetric};
pub use retry::{Classification, ErrorClass, ErrorClassifier, RetryEvent, RetryExecutor, RetryPolicy};
pub use schedule::{estimate, DelayScheduler, OperationComplexity};
pub use search::Searcher;
pub use types::{BatchResult, Comparison, SearchOutcome, SearchTask, TaskResult};
pub use wait::Cancelled;

pub use tokio_util::sync::CancellationToken;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
