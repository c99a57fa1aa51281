//! Redis-backed shared counter for multi-server deployments.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::ports::{CounterError, SharedCounter};

/// Shared counter on Redis INCR.
///
/// INCR is atomic server-side, so every caller across every process gets
/// a distinct, strictly increasing value with no further coordination.
#[derive(Clone)]
pub struct RedisSharedCounter {
    conn: MultiplexedConnection,
    namespace: String,
}

impl RedisSharedCounter {
    /// Creates a counter over an established connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            namespace: "shopguide:counter".to_string(),
        }
    }

    /// Overrides the key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

#[async_trait]
impl SharedCounter for RedisSharedCounter {
    async fn increment(&self, key: &str) -> Result<u64, CounterError> {
        let redis_key = format!("{}:{}", self.namespace, key);
        let mut conn = self.conn.clone();

        let count: i64 = conn
            .incr(&redis_key, 1_i64)
            .await
            .map_err(|e: redis::RedisError| CounterError::Unavailable(e.to_string()))?;

        Ok(count as u64)
    }
}

impl std::fmt::Debug for RedisSharedCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSharedCounter")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
