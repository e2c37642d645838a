//! Proactive pacing between searches.
//!
//! Each finished task is scored for how expensive it was likely to be on the
//! server, and the next task waits proportionally. This keeps bursts below
//! the secondary rate limit instead of waiting to be throttled.

mod complexity;
mod delay;

pub use complexity::{estimate, OperationComplexity};
pub use delay::DelayScheduler;
