//! Runs a batch of searches through retries, pacing and tracking.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::compare;
use crate::config::Config;
use crate::error::{BatchError, ConfigError};
use crate::metrics::PerformanceTracker;
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::schedule::{DelayScheduler, OperationComplexity};
use crate::search::Searcher;
use crate::types::{BatchResult, SearchTask, TaskResult};

/// Which performance report to render after a successful batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    #[default]
    None,
    Summary,
    Detailed,
}

/// Per-run batch settings.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub name: String,
    pub description: String,
    /// Build a cross-search comparison when more than one search ran
    pub compare: bool,
    pub report: ReportMode,
}

impl BatchOptions {
    /// Options for a named batch with comparison and report detail taken
    /// from the `[report]` config section.
    pub fn from_config(
        config: &Config,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let report = if config.report.detailed {
            ReportMode::Detailed
        } else {
            ReportMode::Summary
        };
        Self {
            name: name.into(),
            description: description.into(),
            compare: config.report.compare,
            report,
        }
    }
}

/// Result of a completed batch.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub result: BatchResult,
    pub report: Option<String>,
}

/// Sequential batch driver.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    retry: RetryExecutor,
    scheduler: DelayScheduler,
}

impl BatchExecutor {
    pub fn new(retry: RetryExecutor, scheduler: DelayScheduler) -> Self {
        Self { retry, scheduler }
    }

    /// Build from the `[retry]` and `[schedule]` config sections.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let policy = RetryPolicy::try_from(&config.retry)?;
        Ok(Self::new(
            RetryExecutor::new(policy),
            DelayScheduler::from(&config.schedule),
        ))
    }

    pub fn scheduler(&self) -> &DelayScheduler {
        &self.scheduler
    }

    /// Run `tasks` in order.
    ///
    /// The first search that fails after retries (or permanently) aborts the
    /// batch; later tasks are not attempted. `tracker` is finalized on every
    /// return path.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        searcher: &dyn Searcher,
        tasks: &[SearchTask],
        options: &BatchOptions,
        tracker: &mut PerformanceTracker,
    ) -> Result<BatchOutput, BatchError> {
        tracker.start_batch(tasks.len());
        tracing::info!(
            batch = %options.name,
            searches = tasks.len(),
            backend = searcher.name(),
            "Running search batch"
        );

        let mut results = Vec::with_capacity(tasks.len());

        for (idx, task) in tasks.iter().enumerate() {
            tracker.start_search(&task.name, &task.query);
            let started = Instant::now();
            let mut retries = 0u32;

            let outcome = self
                .retry
                .with_retry_observed(
                    cancel,
                    &task.name,
                    || searcher.search(task),
                    |event| {
                        retries += 1;
                        tracker.record_retry();
                        tracker.record_delay(event.delay);
                    },
                )
                .await;

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracker.end_search(0, Some(&err));
                    tracker.end_batch();
                    return Err(BatchError::TaskFailed {
                        task: task.name.clone(),
                        source: err,
                    });
                }
            };

            tracker.end_search(outcome.result_count, None);
            tracing::info!(
                search = %task.name,
                results = outcome.result_count,
                retries,
                "Search complete ({}/{})",
                idx + 1,
                tasks.len()
            );
            results.push(TaskResult {
                name: task.name.clone(),
                query: task.query.clone(),
                result_count: outcome.result_count,
                retries,
                duration: started.elapsed(),
            });

            if idx + 1 < tasks.len() {
                let complexity = OperationComplexity::of(task);
                match self.scheduler.intelligent_delay(cancel, complexity).await {
                    Ok(delay) => tracker.record_delay(delay),
                    Err(_) => {
                        tracker.end_batch();
                        return Err(BatchError::Cancelled {
                            after_task: task.name.clone(),
                        });
                    }
                }
            }
        }

        let comparison = if options.compare {
            compare(&results)
        } else {
            None
        };

        tracker.end_batch();

        let report = match options.report {
            ReportMode::None => None,
            ReportMode::Summary => Some(tracker.generate_report()),
            ReportMode::Detailed => Some(tracker.generate_detailed_report()),
        };

        Ok(BatchOutput {
            result: BatchResult {
                name: options.name.clone(),
                description: options.description.clone(),
                search_count: results.len(),
                total_results: results.iter().map(|r| r.result_count).sum(),
                results,
                comparison,
            },
            report,
        })
    }
}
