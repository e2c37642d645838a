//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.base_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "retry.base_delay_ms must be > 0".into(),
            ));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::ValidationError(
                "retry.max_delay_ms must be >= retry.base_delay_ms".into(),
            ));
        }
        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 1.0 {
            return Err(ConfigError::ValidationError(
                "retry.backoff_factor must be >= 1.0".into(),
            ));
        }
        if self.retry.rate_limit_ceiling_ms == 0 {
            return Err(ConfigError::ValidationError(
                "retry.rate_limit_ceiling_ms must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
