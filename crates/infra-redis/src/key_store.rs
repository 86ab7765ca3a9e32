// Redis KeyStore Implementation

use crate::connection::{connection_info, map_redis_error};
use async_trait::async_trait;
use bullboard_core::domain::ConnectionParams;
use bullboard_core::error::{AppError, Result};
use bullboard_core::port::{KeyStore, KeyStoreSession};
use redis::aio::MultiplexedConnection;
use tracing::debug;

pub struct RedisKeyStore {
    client: redis::Client,
    scan_count: usize,
}

impl RedisKeyStore {
    /// Create a key store; no connection is opened until `connect`
    ///
    /// # Arguments
    /// * `params` - Redis connection parameters
    /// * `scan_count` - COUNT hint per SCAN round trip
    pub fn new(params: &ConnectionParams, scan_count: usize) -> Result<Self> {
        let client = redis::Client::open(connection_info(params)?)
            .map_err(|e| AppError::Config(format!("invalid redis configuration: {}", e)))?;
        Ok(Self {
            client,
            scan_count: scan_count.max(1),
        })
    }
}

#[async_trait]
impl KeyStore for RedisKeyStore {
    async fn connect(&self) -> Result<Box<dyn KeyStoreSession>> {
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)?;
        debug!("Redis connection opened");
        Ok(Box::new(RedisKeySession {
            conn,
            scan_count: self.scan_count,
        }))
    }
}

/// One Redis connection, closed when dropped
pub struct RedisKeySession {
    conn: MultiplexedConnection,
    scan_count: usize,
}

#[async_trait]
impl KeyStoreSession for RedisKeySession {
    /// Cursor-based SCAN; never blocks the server like KEYS does
    async fn keys(&mut self, pattern: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        let mut rounds = 0usize;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.scan_count)
                .query_async(&mut self.conn)
                .await
                .map_err(map_redis_error)?;

            keys.extend(batch);
            rounds += 1;
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern = %pattern, keys = keys.len(), rounds, "SCAN complete");
        Ok(keys)
    }

    async fn disconnect(self: Box<Self>) -> Result<()> {
        // Multiplexed connections close when the last handle is dropped
        drop(self.conn);
        debug!("Redis connection closed");
        Ok(())
    }
}
