//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Retry and backoff settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// First backoff delay in milliseconds
    pub base_delay_ms: u64,

    /// Upper bound for any computed backoff in milliseconds
    pub max_delay_ms: u64,

    /// Multiplier applied per attempt
    pub backoff_factor: f64,

    /// Longest wait for a rate-limit reset in milliseconds
    pub rate_limit_ceiling_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 120_000,
            backoff_factor: 2.0,
            rate_limit_ceiling_ms: 300_000,
        }
    }
}

/// Pause after each search, chosen by its estimated complexity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub low_delay_ms: u64,
    pub medium_delay_ms: u64,
    pub high_delay_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            low_delay_ms: 500,
            medium_delay_ms: 1000,
            high_delay_ms: 2000,
        }
    }
}

/// Performance report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Include per-search rows and error breakdown
    pub detailed: bool,

    /// Produce cross-search comparisons for multi-search batches
    pub compare: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            detailed: false,
            compare: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
