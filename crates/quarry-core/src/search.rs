//! The search collaborator consumed by the batch executor.
//!
//! Implementations wrap a concrete search API client. They report failures
//! with the structured [`SearchError`] variants whenever the client exposes
//! them, falling back to `SearchError::Other` with the raw message.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{SearchOutcome, SearchTask};

/// Executes a single remote search.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Human-readable backend name for logging.
    fn name(&self) -> &str;

    /// Run `task` once. Retrying is the caller's job.
    async fn search(&self, task: &SearchTask) -> Result<SearchOutcome, SearchError>;
}
