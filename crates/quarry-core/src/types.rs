//! Core data types for search batches.
//!
//! Tasks come in from the caller's configuration layer; results and
//! comparisons go out to whatever renders them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One search to run as part of a batch.
///
/// Validated by whoever builds it (non-empty name and query); the core
/// executes tasks as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTask {
    /// Label used in logs, metrics and errors
    pub name: String,

    /// Query string passed to the search service
    pub query: String,

    /// Upper bound on results requested
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Opaque qualifiers forwarded to the search service (language, repo, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
}

fn default_max_results() -> u32 {
    30
}

impl SearchTask {
    pub fn new(name: impl Into<String>, query: impl Into<String>, max_results: u32) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            max_results,
            filters: BTreeMap::new(),
        }
    }

    /// Add a filter qualifier.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// What a successful search returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub result_count: usize,
}

/// Per-task summary kept in a [`BatchResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub name: String,
    pub query: String,
    pub result_count: usize,
    pub retries: u32,
    /// Wall time of the task, retry backoff included
    pub duration: Duration,
}

/// Cross-task analysis produced when a batch asks for comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Result count per task, in execution order
    pub counts: Vec<(String, usize)>,
    pub combined_total: usize,
    pub largest: String,
    pub smallest: String,
    /// Terms that appear in every query
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_terms: Vec<String>,
    /// Human-readable observations about the spread of results
    pub notes: Vec<String>,
}

/// Aggregated output of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub name: String,
    pub description: String,
    pub search_count: usize,
    pub total_results: usize,
    pub results: Vec<TaskResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_deserialize_defaults() {
        let task: SearchTask = toml::from_str(
            r#"
            name = "async runtimes"
            query = "tokio runtime"
            "#,
        )
        .unwrap();
        assert_eq!(task.max_results, 30);
        assert!(!task.has_filters());
    }

    #[test]
    fn test_task_with_filters() {
        let task = SearchTask::new("rust", "select macro", 50)
            .with_filter("language", "rust")
            .with_filter("user", "tokio-rs");
        assert!(task.has_filters());
        assert_eq!(task.filters.get("language").map(String::as_str), Some("rust"));
    }

    #[test]
    fn test_batch_result_skips_missing_comparison() {
        let result = BatchResult {
            name: "b".to_string(),
            description: String::new(),
            search_count: 0,
            total_results: 0,
            results: vec![],
            comparison: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("comparison"));
    }
}
