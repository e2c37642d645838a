//! Classification of search failures into retry decisions.
//!
//! Structured [`SearchError`] variants are classified directly. The
//! `SearchError::Other` fallback is matched against known message patterns
//! and treated as non-retryable when nothing matches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};

use super::RetryPolicy;
use crate::error::SearchError;

/// Backoff multiplier for timeouts, gentler than the policy default.
const TIMEOUT_BACKOFF_FACTOR: f64 = 1.5;

/// Minimum cooldown after a secondary rate limit without a retry-after hint.
const ABUSE_BASE_COOLDOWN: Duration = Duration::from_secs(60);

/// Extra cooldown added per attempt on top of [`ABUSE_BASE_COOLDOWN`].
const ABUSE_COOLDOWN_STEP: Duration = Duration::from_secs(10);

/// Failure categories that drive retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    RateLimit,
    AbuseDetection,
    ServerError,
    Timeout,
    NetworkError,
    NonRetryable,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::RateLimit => "rate_limit",
            ErrorClass::AbuseDetection => "abuse_detection",
            ErrorClass::ServerError => "server_error",
            ErrorClass::Timeout => "timeout",
            ErrorClass::NetworkError => "network_error",
            ErrorClass::NonRetryable => "non_retryable",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of classifying one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub class: ErrorClass,
    pub retryable: bool,
    /// Wait before the next attempt. Zero when not retryable.
    pub delay: Duration,
}

impl Classification {
    fn retry(class: ErrorClass, delay: Duration) -> Self {
        Self {
            class,
            retryable: true,
            delay,
        }
    }

    fn permanent() -> Self {
        Self {
            class: ErrorClass::NonRetryable,
            retryable: false,
            delay: Duration::ZERO,
        }
    }
}

/// Maps search failures to an [`ErrorClass`], retryability and delay.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    policy: RetryPolicy,
}

impl ErrorClassifier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Classify `error` raised by the zero-based `attempt`.
    pub fn classify(&self, error: &SearchError, attempt: u32) -> Classification {
        self.classify_at(error, attempt, SystemTime::now())
    }

    /// Like [`classify`](Self::classify) with an explicit wall clock, used
    /// to resolve rate-limit reset timestamps.
    pub fn classify_at(&self, error: &SearchError, attempt: u32, now: SystemTime) -> Classification {
        match error {
            SearchError::RateLimit { reset_at, .. } => {
                let until_reset = reset_at.and_then(|reset| reset.duration_since(now).ok());
                let delay = match until_reset {
                    Some(wait) if !wait.is_zero() => wait.min(self.policy.rate_limit_ceiling()),
                    _ => self.backoff(attempt, self.policy.backoff_factor()),
                };
                Classification::retry(ErrorClass::RateLimit, delay)
            }
            SearchError::AbuseDetection { retry_after, .. } => {
                let delay = match retry_after {
                    Some(wait) => (*wait).min(self.policy.rate_limit_ceiling()),
                    None => (ABUSE_BASE_COOLDOWN + ABUSE_COOLDOWN_STEP.saturating_mul(attempt))
                        .min(self.policy.max_delay()),
                };
                Classification::retry(ErrorClass::AbuseDetection, delay)
            }
            SearchError::Server { .. } => self.transient(ErrorClass::ServerError, attempt),
            SearchError::Timeout(_) => self.transient(ErrorClass::Timeout, attempt),
            SearchError::Network(_) => self.transient(ErrorClass::NetworkError, attempt),
            SearchError::Authentication(_)
            | SearchError::Authorization(_)
            | SearchError::NotFound(_)
            | SearchError::Validation { .. } => Classification::permanent(),
            SearchError::Other(message) => match classify_message(message) {
                Some(class) => self.transient(class, attempt),
                None => Classification::permanent(),
            },
        }
    }

    fn transient(&self, class: ErrorClass, attempt: u32) -> Classification {
        let factor = match class {
            ErrorClass::Timeout => TIMEOUT_BACKOFF_FACTOR,
            _ => self.policy.backoff_factor(),
        };
        Classification::retry(class, self.backoff(attempt, factor))
    }

    /// `base_delay * factor^attempt`, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32, factor: f64) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.policy.base_delay().as_secs_f64() * factor.powi(exponent);
        let max = self.policy.max_delay();
        if !secs.is_finite() || secs >= max.as_secs_f64() {
            return max;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Best-effort classification of an unstructured error message.
fn classify_message(message: &str) -> Option<ErrorClass> {
    let lower = message.to_lowercase();
    if is_server_message(&lower) {
        Some(ErrorClass::ServerError)
    } else if ["timeout", "timed out", "deadline exceeded"]
        .iter()
        .any(|p| lower.contains(p))
    {
        Some(ErrorClass::Timeout)
    } else if [
        "connection refused",
        "connection reset",
        "connection closed",
        "no such host",
        "network is unreachable",
        "broken pipe",
        "unexpected eof",
        "dns",
    ]
    .iter()
    .any(|p| lower.contains(p))
    {
        Some(ErrorClass::NetworkError)
    } else {
        None
    }
}

fn is_server_message(lower: &str) -> bool {
    const PHRASES: [&str; 4] = [
        "internal server error",
        "bad gateway",
        "service unavailable",
        "gateway timeout",
    ];
    if PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    // Bare "500" appears in too many unrelated messages; require a status prefix
    ["http ", "status ", "status code ", "status: "]
        .iter()
        .any(|prefix| has_5xx_after(lower, prefix))
}

fn has_5xx_after(lower: &str, prefix: &str) -> bool {
    lower.match_indices(prefix).any(|(idx, _)| {
        let code: Vec<u8> = lower.as_bytes()[idx + prefix.len()..]
            .iter()
            .take(3)
            .copied()
            .collect();
        code.len() == 3 && code[0] == b'5' && code[1..].iter().all(u8::is_ascii_digit)
    })
}
