//! Sequential batch execution with retries, pacing and aggregation.
//!
//! Searches run one at a time on purpose: the secondary rate limit is
//! shared per account, so parallel searches would only trip it sooner.

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::metrics::PerformanceTracker;
use crate::search::Searcher;
use crate::types::SearchTask;

mod compare;
mod executor;

pub use compare::compare;
pub use executor::{BatchExecutor, BatchOptions, BatchOutput, ReportMode};

/// Run `tasks` with retry, pacing and report settings taken from `config`.
pub async fn run_batch(
    config: &Config,
    cancel: &CancellationToken,
    searcher: &dyn Searcher,
    tasks: &[SearchTask],
    name: &str,
    description: &str,
    tracker: &mut PerformanceTracker,
) -> crate::Result<BatchOutput> {
    let executor = BatchExecutor::from_config(config)?;
    let options = BatchOptions::from_config(config, name, description);
    Ok(executor.run(cancel, searcher, tasks, &options, tracker).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QuarryError, SearchError};
    use crate::types::SearchOutcome;
    use async_trait::async_trait;

    struct FixedSearcher(Result<SearchOutcome, SearchError>);

    #[async_trait]
    impl Searcher for FixedSearcher {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _task: &SearchTask) -> Result<SearchOutcome, SearchError> {
            self.0.clone()
        }
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.schedule.low_delay_ms = 0;
        config.schedule.medium_delay_ms = 0;
        config.schedule.high_delay_ms = 0;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_batch_uses_config_report_settings() {
        let mut config = fast_config();
        config.report.detailed = true;
        let searcher = FixedSearcher(Ok(SearchOutcome { result_count: 4 }));
        let tasks = vec![
            SearchTask::new("a", "tokio", 10),
            SearchTask::new("b", "tokio runtime", 10),
        ];
        let mut tracker = PerformanceTracker::new();

        let output = run_batch(
            &config,
            &CancellationToken::new(),
            &searcher,
            &tasks,
            "pair",
            "",
            &mut tracker,
        )
        .await
        .unwrap();

        assert_eq!(output.result.name, "pair");
        assert_eq!(output.result.total_results, 8);
        assert!(output.result.comparison.is_some());
        assert!(output.report.unwrap().contains("[ok  ] a"));
    }

    #[tokio::test]
    async fn test_run_batch_rejects_invalid_retry_config() {
        let mut config = fast_config();
        config.retry.base_delay_ms = 0;
        let searcher = FixedSearcher(Ok(SearchOutcome::default()));
        let mut tracker = PerformanceTracker::new();

        let err = run_batch(
            &config,
            &CancellationToken::new(),
            &searcher,
            &[SearchTask::new("a", "tokio", 10)],
            "bad",
            "",
            &mut tracker,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, QuarryError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_batch_wraps_task_failure() {
        let searcher = FixedSearcher(Err(SearchError::NotFound("repo".to_string())));
        let mut tracker = PerformanceTracker::new();

        let err = run_batch(
            &fast_config(),
            &CancellationToken::new(),
            &searcher,
            &[SearchTask::new("missing", "ghost", 10)],
            "lookup",
            "",
            &mut tracker,
        )
        .await
        .unwrap_err();

        match err {
            QuarryError::Batch(batch) => assert_eq!(batch.task(), "missing"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(tracker.metrics().failed_searches, 1);
    }
}
