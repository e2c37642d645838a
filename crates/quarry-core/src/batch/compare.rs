//! Cross-search comparison of result counts and query terms.

use std::collections::BTreeSet;

use crate::types::{Comparison, TaskResult};

/// Ratio under which result counts are called similar.
const SIMILAR_RATIO: f64 = 1.5;

/// Compare the results of a multi-search batch. `None` for fewer than two.
pub fn compare(results: &[TaskResult]) -> Option<Comparison> {
    let (first, rest) = results.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut largest = first;
    let mut smallest = first;
    for r in rest {
        if r.result_count > largest.result_count {
            largest = r;
        }
        if r.result_count < smallest.result_count {
            smallest = r;
        }
    }

    let mut notes = Vec::new();
    for r in results.iter().filter(|r| r.result_count == 0) {
        notes.push(format!("'{}' returned no results", r.name));
    }
    if smallest.result_count > 0 {
        let ratio = largest.result_count as f64 / smallest.result_count as f64;
        if ratio < SIMILAR_RATIO {
            notes.push("Result counts are similar across searches".to_string());
        } else {
            notes.push(format!(
                "'{}' returned {ratio:.1}x more results than '{}'",
                largest.name, smallest.name
            ));
        }
    }

    let shared_terms = shared_terms(results);
    if !shared_terms.is_empty() {
        notes.push(format!("All queries share: {}", shared_terms.join(", ")));
    }

    Some(Comparison {
        counts: results
            .iter()
            .map(|r| (r.name.clone(), r.result_count))
            .collect(),
        combined_total: results.iter().map(|r| r.result_count).sum(),
        largest: largest.name.clone(),
        smallest: smallest.name.clone(),
        shared_terms,
        notes,
    })
}

/// Lowercased terms present in every query, sorted.
fn shared_terms(results: &[TaskResult]) -> Vec<String> {
    let mut sets = results.iter().map(|r| {
        r.query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<BTreeSet<_>>()
    });
    let Some(first) = sets.next() else {
        return Vec::new();
    };
    sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect())
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(name: &str, query: &str, count: usize) -> TaskResult {
        TaskResult {
            name: name.to_string(),
            query: query.to_string(),
            result_count: count,
            retries: 0,
            duration: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_single_result_has_no_comparison() {
        assert!(compare(&[]).is_none());
        assert!(compare(&[result("a", "q", 3)]).is_none());
    }

    #[test]
    fn test_counts_and_extremes() {
        let results = [
            result("tokio", "async runtime tokio", 40),
            result("smol", "async runtime smol", 10),
            result("glommio", "async runtime glommio", 25),
        ];
        let c = compare(&results).unwrap();
        assert_eq!(c.combined_total, 75);
        assert_eq!(c.largest, "tokio");
        assert_eq!(c.smallest, "smol");
        assert_eq!(c.counts[2], ("glommio".to_string(), 25));
        assert_eq!(c.shared_terms, vec!["async", "runtime"]);
        assert!(c.notes.iter().any(|n| n.contains("4.0x more results")));
        assert!(c.notes.iter().any(|n| n == "All queries share: async, runtime"));
    }

    #[test]
    fn test_similar_counts_note() {
        let c = compare(&[result("a", "x", 10), result("b", "y", 12)]).unwrap();
        assert!(c.notes.contains(&"Result counts are similar across searches".to_string()));
        assert!(c.shared_terms.is_empty());
    }

    #[test]
    fn test_zero_results_noted() {
        let c = compare(&[result("a", "x", 10), result("empty", "y", 0)]).unwrap();
        assert_eq!(c.smallest, "empty");
        assert!(c.notes.contains(&"'empty' returned no results".to_string()));
        assert!(!c.notes.iter().any(|n| n.contains("more results")));
    }
}
