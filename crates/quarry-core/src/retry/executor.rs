//! Runs an operation with bounded retries and cancellable backoff.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{ErrorClass, ErrorClassifier, RetryPolicy};
use crate::error::{RetryError, SearchError};
use crate::wait::sleep_or_cancel;

/// Emitted after a backoff completes, right before the retry attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryEvent {
    /// Zero-based index of the attempt about to run (always >= 1)
    pub attempt: u32,
    /// Class of the failure that caused the retry
    pub class: ErrorClass,
    /// Backoff that was waited out
    pub delay: Duration,
}

/// Owned retry driver. One instance per policy; no shared state.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    classifier: ErrorClassifier,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            classifier: ErrorClassifier::new(policy),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.classifier.policy()
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Run `operation` until it succeeds, fails permanently, exhausts the
    /// policy or `cancel` fires.
    pub async fn with_retry<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        label: &str,
        operation: F,
    ) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        self.with_retry_observed(cancel, label, operation, |_| {})
            .await
    }

    /// [`with_retry`](Self::with_retry) with a callback invoked once per
    /// retry, after its backoff has elapsed.
    pub async fn with_retry_observed<T, F, Fut, O>(
        &self,
        cancel: &CancellationToken,
        label: &str,
        mut operation: F,
        mut on_retry: O,
    ) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
        O: FnMut(&RetryEvent),
    {
        let max_retries = self.policy().max_retries();
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RetryError::CancelledBeforeStart {
                    label: label.to_string(),
                    attempt,
                });
            }

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(label, attempts = attempt + 1, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            let decision = self.classifier.classify(&error, attempt);
            if !decision.retryable {
                tracing::error!(label, error = %error, "Non-retryable failure");
                return Err(RetryError::NonRetryable {
                    label: label.to_string(),
                    source: error,
                });
            }

            if attempt >= max_retries {
                tracing::error!(
                    label,
                    class = %decision.class,
                    retries = attempt,
                    error = %error,
                    "Retries exhausted"
                );
                return Err(RetryError::Exhausted {
                    label: label.to_string(),
                    class: decision.class,
                    retries: attempt,
                    source: error,
                });
            }

            tracing::warn!(
                label,
                class = %decision.class,
                attempt = attempt + 1,
                max_retries,
                delay_ms = decision.delay.as_millis() as u64,
                error = %error,
                "Search failed, retrying"
            );

            if sleep_or_cancel(cancel, decision.delay).await.is_err() {
                return Err(RetryError::CancelledDuringDelay {
                    label: label.to_string(),
                    attempt,
                    delay: decision.delay,
                });
            }

            attempt += 1;
            on_retry(&RetryEvent {
                attempt,
                class: decision.class,
                delay: decision.delay,
            });
        }
    }
}
