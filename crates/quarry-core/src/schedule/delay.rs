//! Maps complexity classes to pauses between searches.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::OperationComplexity;
use crate::config::ScheduleConfig;
use crate::wait::{sleep_or_cancel, Cancelled};

/// Fixed complexity-to-pause table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayScheduler {
    low: Duration,
    medium: Duration,
    high: Duration,
}

impl DelayScheduler {
    pub fn new(low: Duration, medium: Duration, high: Duration) -> Self {
        Self { low, medium, high }
    }

    /// Scheduler that never pauses.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    pub fn delay_for(&self, complexity: OperationComplexity) -> Duration {
        match complexity {
            OperationComplexity::Low => self.low,
            OperationComplexity::Medium => self.medium,
            OperationComplexity::High => self.high,
        }
    }

    /// Sleep for the pause belonging to `complexity`.
    ///
    /// Returns the pause on completion. A zero pause returns at once without
    /// looking at `cancel`.
    pub async fn intelligent_delay(
        &self,
        cancel: &CancellationToken,
        complexity: OperationComplexity,
    ) -> Result<Duration, Cancelled> {
        let delay = self.delay_for(complexity);
        if delay.is_zero() {
            return Ok(delay);
        }
        tracing::debug!(%complexity, delay_ms = delay.as_millis() as u64, "Pacing before next search");
        sleep_or_cancel(cancel, delay).await?;
        Ok(delay)
    }
}

impl Default for DelayScheduler {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(500),
            Duration::from_secs(1),
            Duration::from_secs(2),
        )
    }
}

impl From<&ScheduleConfig> for DelayScheduler {
    fn from(config: &ScheduleConfig) -> Self {
        Self::new(
            Duration::from_millis(config.low_delay_ms),
            Duration::from_millis(config.medium_delay_ms),
            Duration::from_millis(config.high_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_default_mapping() {
        let scheduler = DelayScheduler::default();
        assert_eq!(scheduler.delay_for(OperationComplexity::Low), Duration::from_millis(500));
        assert_eq!(scheduler.delay_for(OperationComplexity::Medium), Duration::from_secs(1));
        assert_eq!(scheduler.delay_for(OperationComplexity::High), Duration::from_secs(2));
    }

    #[test]
    fn test_from_default_config_matches_default() {
        assert_eq!(
            DelayScheduler::from(&ScheduleConfig::default()),
            DelayScheduler::default()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_sleeps_for_mapped_duration() {
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let slept = DelayScheduler::default()
            .intelligent_delay(&cancel, OperationComplexity::High)
            .await
            .unwrap();
        assert_eq!(slept, Duration::from_secs(2));
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_zero_delay_ignores_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let slept = DelayScheduler::disabled()
            .intelligent_delay(&cancel, OperationComplexity::High)
            .await;
        assert_eq!(slept, Ok(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_delay() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let result = DelayScheduler::default()
            .intelligent_delay(&cancel, OperationComplexity::High)
            .await;
        assert_eq!(result, Err(Cancelled));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
