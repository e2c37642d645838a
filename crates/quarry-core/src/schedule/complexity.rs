//! Heuristic server-side cost estimate for a search.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::SearchTask;

/// Coarse cost class of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationComplexity {
    Low,
    Medium,
    High,
}

impl OperationComplexity {
    /// Classify an accumulated heuristic score.
    fn from_score(score: u32) -> Self {
        match score {
            s if s >= 4 => Self::High,
            s if s >= 2 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Complexity of a prepared task.
    pub fn of(task: &SearchTask) -> Self {
        estimate(&task.query, task.max_results, task.has_filters())
    }
}

impl fmt::Display for OperationComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Estimate complexity from query shape, requested size and filter use.
///
/// Scoring: more than 3 terms +1, a `*` or `?` wildcard +1, more than 100
/// results +2 (more than 50: +1), filters +1. Score >= 4 is high, >= 2 is
/// medium. Every input only ever adds to the score.
pub fn estimate(query: &str, max_results: u32, has_filters: bool) -> OperationComplexity {
    let mut score = 0;

    if query.split_whitespace().count() > 3 {
        score += 1;
    }
    if query.contains(['*', '?']) {
        score += 1;
    }
    if max_results > 100 {
        score += 2;
    } else if max_results > 50 {
        score += 1;
    }
    if has_filters {
        score += 1;
    }

    OperationComplexity::from_score(score)
}
