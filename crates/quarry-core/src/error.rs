//! Error types for the Quarry search orchestration core.
//!
//! Errors are organized by layer so callers can tell apart what the remote
//! service reported (`SearchError`), what the retry loop decided
//! (`RetryError`) and which task of a batch gave up (`BatchError`).

use std::time::{Duration, SystemTime};
use thiserror::Error;

use crate::retry::ErrorClass;

/// Top-level error type for Quarry operations.
#[derive(Error, Debug)]
pub enum QuarryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A batch aborted before completing every task
    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures reported by the remote search collaborator.
///
/// The structured variants are the primary contract. `Other` carries an
/// unstructured message and is classified by pattern matching as a
/// best-effort fallback.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    /// Primary rate limit hit; `reset_at` is when the quota refills
    #[error("API rate limit exceeded ({remaining}/{limit} requests remaining)")]
    RateLimit {
        limit: u32,
        remaining: u32,
        reset_at: Option<SystemTime>,
    },

    /// Secondary (abuse detection) limit hit
    #[error("Secondary rate limit triggered: {message}")]
    AbuseDetection {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Bad or missing credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Credentials valid but lacking permission
    #[error("Access forbidden: {0}")]
    Authorization(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query rejected by the service
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<String>,
    },

    /// HTTP 5xx response
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Transport-level failure (DNS, connection refused/reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Anything the collaborator could not structure
    #[error("{0}")]
    Other(String),
}

/// Failure of an operation run under [`crate::RetryExecutor`].
#[derive(Error, Debug)]
pub enum RetryError {
    /// Cancellation was observed before an attempt started
    #[error("{label}: cancelled before attempt {}", .attempt + 1)]
    CancelledBeforeStart { label: String, attempt: u32 },

    /// Cancellation interrupted the backoff between two attempts
    #[error("{label}: cancelled during retry delay of {delay:?} after attempt {}", .attempt + 1)]
    CancelledDuringDelay {
        label: String,
        attempt: u32,
        delay: Duration,
    },

    /// The error cannot be fixed by retrying
    #[error("{label}: non-retryable error: {source}")]
    NonRetryable {
        label: String,
        #[source]
        source: SearchError,
    },

    /// Every allowed attempt failed with a retryable error
    #[error("{}", exhausted_message(.label, *.class, *.retries, .source))]
    Exhausted {
        label: String,
        class: ErrorClass,
        retries: u32,
        #[source]
        source: SearchError,
    },
}

impl RetryError {
    /// Error class of the final failure, if the operation ran and failed.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::Exhausted { class, .. } => Some(*class),
            Self::NonRetryable { .. } => Some(ErrorClass::NonRetryable),
            Self::CancelledBeforeStart { .. } | Self::CancelledDuringDelay { .. } => None,
        }
    }

    /// Number of retries performed before giving up.
    pub fn retries(&self) -> u32 {
        match self {
            Self::Exhausted { retries, .. } => *retries,
            Self::CancelledBeforeStart { attempt, .. } => *attempt,
            Self::CancelledDuringDelay { attempt, .. } => *attempt,
            Self::NonRetryable { .. } => 0,
        }
    }

    /// True when the caller asked to stop, as opposed to the operation giving up.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::CancelledBeforeStart { .. } | Self::CancelledDuringDelay { .. }
        )
    }

    /// The underlying service error, when there is one.
    pub fn search_error(&self) -> Option<&SearchError> {
        match self {
            Self::NonRetryable { source, .. } | Self::Exhausted { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Final-error text, tailored to the class that exhausted the retries.
fn exhausted_message(label: &str, class: ErrorClass, retries: u32, source: &SearchError) -> String {
    match class {
        ErrorClass::RateLimit => format!(
            "{label}: rate limit still exceeded after {retries} retries ({source}); \
             wait for the quota to reset or reduce the number of searches"
        ),
        ErrorClass::AbuseDetection => format!(
            "{label}: secondary rate limit persisted after {retries} retries ({source}); \
             space searches further apart and lower per-search result counts"
        ),
        ErrorClass::ServerError => format!(
            "{label}: search service kept failing after {retries} retries ({source}); \
             the service may be degraded, try again later"
        ),
        _ => format!("{label}: failed after {retries} retries: {source}"),
    }
}

/// Batch-level failure: identifies which named task stopped the batch.
#[derive(Error, Debug)]
pub enum BatchError {
    /// A task failed unrecoverably; remaining tasks were not attempted
    #[error("search '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: RetryError,
    },

    /// Cancellation arrived during the pause between two tasks
    #[error("batch cancelled during scheduled delay after search '{after_task}'")]
    Cancelled { after_task: String },
}

impl BatchError {
    /// True when the batch stopped because it was asked to.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::TaskFailed { source, .. } => source.is_cancelled(),
            Self::Cancelled { .. } => true,
        }
    }

    /// Name of the task that failed or preceded the cancellation.
    pub fn task(&self) -> &str {
        match self {
            Self::TaskFailed { task, .. } => task,
            Self::Cancelled { after_task } => after_task,
        }
    }
}

/// Convenience type alias for Quarry results.
pub type Result<T> = std::result::Result<T, QuarryError>;
