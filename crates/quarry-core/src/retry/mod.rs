//! Bounded retries with classified, cancellable backoff.
//!
//! [`ErrorClassifier`] turns a [`crate::SearchError`] into a retry decision;
//! [`RetryExecutor`] drives an operation through those decisions.

mod classify;
mod executor;

pub use classify::{Classification, ErrorClass, ErrorClassifier};
pub use executor::{RetryEvent, RetryExecutor};

use crate::config::RetryConfig;
use crate::error::ConfigError;
use std::time::Duration;

/// Default cap on how long a primary rate-limit reset is waited for.
pub const DEFAULT_RATE_LIMIT_CEILING: Duration = Duration::from_secs(300);

/// Immutable retry parameters.
///
/// Only constructible through [`RetryPolicy::new`], [`Default`] or
/// `TryFrom<&RetryConfig>`, so every instance satisfies the range rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff_factor: f64,
    rate_limit_ceiling: Duration,
}

impl RetryPolicy {
    /// Build a policy, rejecting a zero base delay, `max_delay < base_delay`
    /// and backoff factors below 1.
    pub fn new(
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_factor: f64,
    ) -> Result<Self, ConfigError> {
        if base_delay.is_zero() {
            return Err(ConfigError::ValidationError(
                "retry base delay must be > 0".into(),
            ));
        }
        if max_delay < base_delay {
            return Err(ConfigError::ValidationError(format!(
                "retry max delay ({max_delay:?}) must be >= base delay ({base_delay:?})"
            )));
        }
        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "retry backoff factor must be >= 1.0, got {backoff_factor}"
            )));
        }
        Ok(Self {
            max_retries,
            base_delay,
            max_delay,
            backoff_factor,
            rate_limit_ceiling: DEFAULT_RATE_LIMIT_CEILING,
        })
    }

    /// Retries after the first attempt; the operation runs at most `max_retries + 1` times.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Longest wait honored for a rate-limit reset or retry-after hint.
    pub fn rate_limit_ceiling(&self) -> Duration {
        self.rate_limit_ceiling
    }

    /// Replace the rate-limit reset ceiling.
    pub fn with_rate_limit_ceiling(mut self, ceiling: Duration) -> Result<Self, ConfigError> {
        if ceiling.is_zero() {
            return Err(ConfigError::ValidationError(
                "rate limit ceiling must be > 0".into(),
            ));
        }
        self.rate_limit_ceiling = ceiling;
        Ok(self)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(120),
            backoff_factor: 2.0,
            rate_limit_ceiling: DEFAULT_RATE_LIMIT_CEILING,
        }
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.backoff_factor,
        )?
        .with_rate_limit_ceiling(Duration::from_millis(config.rate_limit_ceiling_ms))
    }
}
