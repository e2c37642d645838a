//! Cancellable sleeping shared by retry backoff and inter-search delays.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Returned when a wait is cut short by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Sleep for `duration` unless `cancel` fires first.
///
/// Cancellation wins ties, so an already-cancelled token never sleeps.
pub async fn sleep_or_cancel(cancel: &CancellationToken, duration: Duration) -> Result<(), Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    if duration.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
