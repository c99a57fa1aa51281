//! Round-robin credential rotation over a shared counter.
//!
//! One rotator is built per upstream service at startup. The pool is
//! immutable after construction; fairness comes from the shared counter's
//! atomic increment, and availability always wins over fairness: if the
//! counter store is down the rotator falls back to the first credential
//! instead of failing the turn.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use tracing::warn;

use crate::ports::SharedCounter;

/// Rotation errors.
#[derive(Debug, Clone, Error)]
pub enum RotationError {
    /// The pool is empty; configuration validation should have caught this.
    #[error("No credentials available for service '{0}'")]
    NoCredentialsAvailable(String),
}

/// A credential issued for one outbound call.
#[derive(Clone)]
pub struct IssuedCredential {
    /// The credential value.
    pub secret: SecretString,
    /// Pool index, for usage recording.
    pub index: usize,
    /// True when the shared counter was unreachable and rotation fell
    /// back to index 0.
    pub degraded: bool,
}

/// Per-credential usage figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CredentialStats {
    /// Calls recorded against this credential.
    pub total: u64,
    /// Successful calls.
    pub success_count: u64,
    /// Failed calls.
    pub failure_count: u64,
    /// Mean recorded latency.
    pub avg_latency: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
struct UsageAccumulator {
    total: u64,
    success: u64,
    failure: u64,
    latency_sum: Duration,
    latency_count: u64,
}

/// Round-robins a pool of credentials for one upstream service.
pub struct CredentialRotator {
    service: String,
    pool: Vec<SecretString>,
    counter: Arc<dyn SharedCounter>,
    usage: Mutex<Vec<UsageAccumulator>>,
}

impl CredentialRotator {
    /// Creates a rotator over a pool, keyed by service name in the
    /// shared counter store.
    pub fn new(
        service: impl Into<String>,
        pool: Vec<SecretString>,
        counter: Arc<dyn SharedCounter>,
    ) -> Self {
        let usage = vec![UsageAccumulator::default(); pool.len()];
        Self {
            service: service.into(),
            pool,
            counter,
            usage: Mutex::new(usage),
        }
    }

    /// Returns the pool size.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Issues the next credential in rotation.
    ///
    /// A single-credential pool never touches the shared counter. With a
    /// larger pool, one atomic increment yields a distinct counter value
    /// per caller, which maps straight to a pool index. If the counter
    /// store is unreachable the rotator fails open to index 0 and marks
    /// the issue as degraded.
    ///
    /// # Errors
    ///
    /// - `NoCredentialsAvailable` if the pool is empty
    pub async fn next(&self) -> Result<IssuedCredential, RotationError> {
        if self.pool.is_empty() {
            return Err(RotationError::NoCredentialsAvailable(self.service.clone()));
        }
        if self.pool.len() == 1 {
            return Ok(IssuedCredential {
                secret: self.pool[0].clone(),
                index: 0,
                degraded: false,
            });
        }

        let key = format!("rotation:{}", self.service);
        match self.counter.increment(&key).await {
            Ok(count) => {
                let index = ((count - 1) % self.pool.len() as u64) as usize;
                Ok(IssuedCredential {
                    secret: self.pool[index].clone(),
                    index,
                    degraded: false,
                })
            }
            Err(e) => {
                warn!(
                    service = %self.service,
                    error = %e,
                    "shared counter unreachable, falling back to credential 0"
                );
                Ok(IssuedCredential {
                    secret: self.pool[0].clone(),
                    index: 0,
                    degraded: true,
                })
            }
        }
    }

    /// Accumulates the outcome of one outbound call.
    ///
    /// Never blocks the caller's hot path and never fails: an
    /// out-of-range index is logged and dropped.
    pub fn record_usage(&self, index: usize, success: bool, latency: Duration) {
        let mut usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());
        let Some(acc) = usage.get_mut(index) else {
            warn!(
                service = %self.service,
                index,
                pool_size = self.pool.len(),
                "usage record for out-of-range credential index ignored"
            );
            return;
        };
        acc.total += 1;
        if success {
            acc.success += 1;
        } else {
            acc.failure += 1;
        }
        acc.latency_sum += latency;
        acc.latency_count += 1;
    }

    /// Returns usage figures for one credential, or `None` if the index
    /// is out of range.
    pub fn stats(&self, index: usize) -> Option<CredentialStats> {
        let usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());
        usage.get(index).map(|acc| CredentialStats {
            total: acc.total,
            success_count: acc.success,
            failure_count: acc.failure,
            avg_latency: if acc.latency_count == 0 {
                Duration::ZERO
            } else {
                acc.latency_sum / acc.latency_count as u32
            },
        })
    }
}

impl std::fmt::Debug for CredentialRotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRotator")
            .field("service", &self.service)
            .field("pool_size", &self.pool.len())
            .finish_non_exhaustive()
    }
}
