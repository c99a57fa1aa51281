//! In-memory shared counter for tests and single-node hosts.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::{CounterError, SharedCounter};

/// Process-local counter map.
///
/// Thread-safe via internal `Mutex`. Suitable for single-server
/// deployments or testing; loses counts across restarts, which only
/// costs rotation fairness, never correctness.
#[derive(Debug, Default)]
pub struct InMemorySharedCounter {
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemorySharedCounter {
    /// Creates an empty counter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current value under a key without incrementing.
    pub fn current(&self, key: &str) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl SharedCounter for InMemorySharedCounter {
    async fn increment(&self, key: &str) -> Result<u64, CounterError> {
        let mut counters = self.counters.lock().unwrap();
        let value = counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}
