//! Timing, retry and delay bookkeeping for a batch of searches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

use crate::error::RetryError;
use crate::retry::ErrorClass;

/// Immutable record of one finished search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMetric {
    pub task_name: String,
    pub query: String,
    pub start_time: SystemTime,
    /// Wall time from start to end, retry backoff included
    pub duration: Duration,
    pub result_count: usize,
    pub retry_count: u32,
    /// Retry backoff spent inside this search
    pub delay_time: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_class: Option<ErrorClass>,
    pub success: bool,
}

impl SearchMetric {
    /// Time spent waiting on the service, excluding backoff.
    pub fn response_time(&self) -> Duration {
        self.duration.saturating_sub(self.delay_time)
    }
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    /// Searches announced at batch start
    pub planned_searches: usize,
    /// Searches that ran to an outcome
    pub total_searches: usize,
    pub successful_searches: usize,
    pub failed_searches: usize,
    /// Sum of result counts over successful searches
    pub total_results: usize,
    pub total_retries: u32,
    /// Retry backoff plus pauses between searches
    pub total_delay_time: Duration,
    pub total_duration: Duration,
    /// Mean of `duration - delay_time` over successful searches
    pub average_response_time: Duration,
    pub error_counts: BTreeMap<ErrorClass, usize>,
    pub searches: Vec<SearchMetric>,
    /// Set once by [`PerformanceTracker::end_batch`]
    pub finalized: bool,
}

#[derive(Debug)]
struct OpenSearch {
    task_name: String,
    query: String,
    start_time: SystemTime,
    started: Instant,
    retry_count: u32,
    delay_time: Duration,
}

/// Single-owner tracker; at most one search is open at a time.
#[derive(Debug, Default)]
pub struct PerformanceTracker {
    metrics: BatchMetrics,
    batch_started: Option<Instant>,
    current: Option<OpenSearch>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset counters and start timing a batch of `planned` searches.
    pub fn start_batch(&mut self, planned: usize) {
        self.metrics = BatchMetrics {
            planned_searches: planned,
            ..BatchMetrics::default()
        };
        self.current = None;
        self.batch_started = Some(Instant::now());
        tracing::info!(planned, "Starting search batch");
    }

    /// Open a search. An unfinished previous search is discarded.
    pub fn start_search(&mut self, task_name: &str, query: &str) {
        if self.is_frozen() {
            return;
        }
        if let Some(open) = self.current.take() {
            tracing::warn!(
                task = %open.task_name,
                "Search started while another was open; discarding the unfinished one"
            );
        }
        self.current = Some(OpenSearch {
            task_name: task_name.to_string(),
            query: query.to_string(),
            start_time: SystemTime::now(),
            started: Instant::now(),
            retry_count: 0,
            delay_time: Duration::ZERO,
        });
    }

    /// Count one retry against the open search and the batch.
    pub fn record_retry(&mut self) {
        if self.is_frozen() {
            return;
        }
        self.metrics.total_retries += 1;
        if let Some(open) = self.current.as_mut() {
            open.retry_count += 1;
        }
    }

    /// Record time spent waiting.
    ///
    /// Always added to the batch total; also attributed to the open search,
    /// if any, so pauses between searches never count against a search.
    pub fn record_delay(&mut self, delay: Duration) {
        if self.is_frozen() {
            return;
        }
        self.metrics.total_delay_time += delay;
        if let Some(open) = self.current.as_mut() {
            open.delay_time += delay;
        }
    }

    /// Close the open search with its outcome.
    pub fn end_search(&mut self, result_count: usize, error: Option<&RetryError>) {
        if self.is_frozen() {
            return;
        }
        match error {
            None => self.close_search(result_count, true, None),
            Some(err) => self.close_search(result_count, false, err.class()),
        }
    }

    fn close_search(&mut self, result_count: usize, success: bool, error_class: Option<ErrorClass>) {
        let Some(open) = self.current.take() else {
            tracing::warn!("end_search called with no open search");
            return;
        };

        let metric = SearchMetric {
            task_name: open.task_name,
            query: open.query,
            start_time: open.start_time,
            duration: open.started.elapsed().max(open.delay_time),
            result_count,
            retry_count: open.retry_count,
            delay_time: open.delay_time,
            error_class,
            success,
        };

        let m = &mut self.metrics;
        m.total_searches += 1;
        if success {
            m.successful_searches += 1;
            m.total_results += result_count;
        } else {
            m.failed_searches += 1;
            if let Some(class) = error_class {
                *m.error_counts.entry(class).or_insert(0) += 1;
            }
        }
        m.searches.push(metric);
    }

    /// Finalize the batch. Later calls to any recording method are ignored.
    pub fn end_batch(&mut self) {
        if self.is_frozen() {
            return;
        }
        if self.current.is_some() {
            tracing::warn!("Batch ended with a search still open; recording it as failed");
            self.close_search(0, false, None);
        }

        let m = &mut self.metrics;
        m.total_duration = self
            .batch_started
            .map(|started| started.elapsed())
            .unwrap_or_default();

        let (response_sum, successes) = m
            .searches
            .iter()
            .filter(|s| s.success)
            .fold((Duration::ZERO, 0u32), |(sum, n), s| (sum + s.response_time(), n + 1));
        m.average_response_time = if successes > 0 {
            response_sum / successes
        } else {
            Duration::ZERO
        };
        m.finalized = true;

        tracing::info!(
            searches = m.total_searches,
            succeeded = m.successful_searches,
            failed = m.failed_searches,
            retries = m.total_retries,
            duration_ms = m.total_duration.as_millis() as u64,
            "Search batch finished"
        );
    }

    pub fn metrics(&self) -> &BatchMetrics {
        &self.metrics
    }

    /// Consume the tracker, keeping its metrics.
    pub fn into_metrics(self) -> BatchMetrics {
        self.metrics
    }

    /// Summary performance report.
    pub fn generate_report(&self) -> String {
        self.metrics.summary_report()
    }

    /// Summary plus per-search rows and error breakdown.
    pub fn generate_detailed_report(&self) -> String {
        self.metrics.detailed_report()
    }

    fn is_frozen(&self) -> bool {
        if self.metrics.finalized {
            tracing::warn!("Ignoring update to a finalized batch");
        }
        self.metrics.finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;

    fn exhausted(class: ErrorClass) -> RetryError {
        RetryError::Exhausted {
            label: "t".to_string(),
            class,
            retries: 2,
            source: SearchError::Other("fail".to_string()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_are_consistent() {
        let mut tracker = PerformanceTracker::new();
        tracker.start_batch(3);

        tracker.start_search("a", "tokio");
        tracker.end_search(10, None);

        tracker.start_search("b", "serde");
        tracker.record_retry();
        tracker.end_search(0, Some(&exhausted(ErrorClass::ServerError)));

        tracker.start_search("c", "axum");
        tracker.end_search(5, None);
        tracker.end_batch();

        let m = tracker.metrics();
        assert!(m.finalized);
        assert_eq!(m.planned_searches, 3);
        assert_eq!(m.total_searches, 3);
        assert_eq!(m.successful_searches + m.failed_searches, m.total_searches);
        assert_eq!(m.total_results, 15);
        assert_eq!(m.total_retries, 1);
        assert_eq!(m.error_counts.get(&ErrorClass::ServerError), Some(&1));
        assert_eq!(m.searches[1].retry_count, 1);
        assert!(!m.searches[1].success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_average_response_time_excludes_delay() {
        let mut tracker = PerformanceTracker::new();
        tracker.start_batch(2);

        tracker.start_search("a", "q1");
        tokio::time::sleep(Duration::from_millis(300)).await;
        tracker.record_delay(Duration::from_millis(100));
        tracker.end_search(1, None);

        // Pause between searches belongs to the batch only
        tokio::time::sleep(Duration::from_millis(500)).await;
        tracker.record_delay(Duration::from_millis(500));

        tracker.start_search("b", "q2");
        tokio::time::sleep(Duration::from_millis(700)).await;
        tracker.record_delay(Duration::from_millis(200));
        tracker.end_search(1, None);
        tracker.end_batch();

        let m = tracker.metrics();
        let expected: Duration = m
            .searches
            .iter()
            .map(|s| s.duration - s.delay_time)
            .sum::<Duration>()
            / 2;
        assert_eq!(m.average_response_time, expected);
        // (300 - 100 + 700 - 200) / 2 = 350ms
        let avg_ms = m.average_response_time.as_millis();
        assert!((350..355).contains(&avg_ms), "{avg_ms}");
        assert_eq!(m.total_delay_time, Duration::from_millis(800));
        assert_eq!(m.searches[0].delay_time, Duration::from_millis(100));
        assert_eq!(m.searches[1].delay_time, Duration::from_millis(200));
        for s in &m.searches {
            assert!(s.duration >= s.delay_time);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_searches_excluded_from_average() {
        let mut tracker = PerformanceTracker::new();
        tracker.start_batch(2);

        tracker.start_search("ok", "q");
        tokio::time::sleep(Duration::from_millis(100)).await;
        tracker.end_search(3, None);

        tracker.start_search("bad", "q");
        tokio::time::sleep(Duration::from_secs(10)).await;
        tracker.end_search(0, Some(&exhausted(ErrorClass::Timeout)));
        tracker.end_batch();

        let avg_ms = tracker.metrics().average_response_time.as_millis();
        assert!((100..105).contains(&avg_ms), "{avg_ms}");
    }

    #[test]
    fn test_end_search_without_start_is_ignored() {
        let mut tracker = PerformanceTracker::new();
        tracker.start_batch(1);
        tracker.end_search(5, None);
        assert_eq!(tracker.metrics().total_searches, 0);
    }

    #[test]
    fn test_end_batch_closes_open_search_as_failed() {
        let mut tracker = PerformanceTracker::new();
        tracker.start_batch(1);
        tracker.start_search("dangling", "q");
        tracker.end_batch();

        let m = tracker.metrics();
        assert_eq!(m.failed_searches, 1);
        assert_eq!(m.searches[0].error_class, None);
        assert_eq!(m.successful_searches + m.failed_searches, m.total_searches);
    }

    #[test]
    fn test_metrics_frozen_after_end_batch() {
        let mut tracker = PerformanceTracker::new();
        tracker.start_batch(1);
        tracker.start_search("a", "q");
        tracker.end_search(4, None);
        tracker.end_batch();
        let frozen = tracker.metrics().clone();

        tracker.start_search("late", "q");
        tracker.record_retry();
        tracker.record_delay(Duration::from_secs(1));
        tracker.end_search(9, None);
        tracker.end_batch();

        assert_eq!(tracker.metrics(), &frozen);
    }

    #[test]
    fn test_cancelled_search_has_no_class() {
        let mut tracker = PerformanceTracker::new();
        tracker.start_batch(1);
        tracker.start_search("a", "q");
        let cancelled = RetryError::CancelledBeforeStart {
            label: "a".to_string(),
            attempt: 0,
        };
        tracker.end_search(0, Some(&cancelled));
        tracker.end_batch();

        let m = tracker.metrics();
        assert_eq!(m.failed_searches, 1);
        assert!(m.error_counts.is_empty());
    }
}
