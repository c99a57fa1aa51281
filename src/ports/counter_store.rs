//! Shared counter port - the single external call of the decision core.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the shared counter substrate.
#[derive(Debug, Clone, Error)]
pub enum CounterError {
    /// The counter store could not be reached.
    ///
    /// Transient infrastructure error: callers degrade gracefully
    /// instead of aborting the chat turn.
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),
}

/// Port for an externally durable, atomically incremented counter.
///
/// The atomic increment is the entire concurrency-safety mechanism of
/// credential rotation: every caller receives a distinct, strictly
/// increasing value, so no additional locking is needed anywhere.
#[async_trait]
pub trait SharedCounter: Send + Sync {
    /// Atomically increments the counter under `key` and returns the
    /// post-increment value (first call returns 1).
    async fn increment(&self, key: &str) -> Result<u64, CounterError>;
}
