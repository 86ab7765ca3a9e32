// Redis Queue Clients (Bull / BullMQ key layouts)

use crate::connection::{connection_info, map_redis_error};
use async_trait::async_trait;
use bullboard_core::domain::{ConnectionParams, JobCounts, ModernQueueOptions, DEFAULT_KEY_PREFIX};
use bullboard_core::error::{AppError, Result};
use bullboard_core::port::{QueueClient, QueueClientFactory};
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Per-state key layout of a queue engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayout {
    /// Bull: wait/active/paused lists, completed/failed/delayed sorted sets
    Legacy,
    /// BullMQ: as Bull, plus the `prioritized` sorted set counted as waiting
    Modern,
}

/// Queue client reading job counts straight from Redis
pub struct RedisQueueClient {
    name: String,
    key_prefix: String,
    layout: KeyLayout,
    client: redis::Client,
    // Opened on first use and shared by later lookups
    conn: OnceCell<MultiplexedConnection>,
}

impl RedisQueueClient {
    fn new(name: &str, key_prefix: &str, layout: KeyLayout, client: redis::Client) -> Self {
        Self {
            name: name.to_string(),
            key_prefix: key_prefix.to_string(),
            layout,
            client,
            conn: OnceCell::new(),
        }
    }

    /// Shared multiplexed connection; a failed attempt is retried on the next call
    async fn connection(&self) -> Result<MultiplexedConnection> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                self.client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(map_redis_error)
            })
            .await?;
        Ok(conn.clone())
    }

    fn key(&self, state: &str) -> String {
        format!("{}:{}:{}", self.key_prefix, self.name, state)
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }
}

#[async_trait]
impl QueueClient for RedisQueueClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    async fn job_counts(&self) -> Result<JobCounts> {
        let mut conn = self.connection().await?;

        let mut pipe = redis::pipe();
        pipe.cmd("LLEN")
            .arg(self.key("wait"))
            .cmd("LLEN")
            .arg(self.key("active"))
            .cmd("ZCARD")
            .arg(self.key("completed"))
            .cmd("ZCARD")
            .arg(self.key("failed"))
            .cmd("ZCARD")
            .arg(self.key("delayed"))
            .cmd("LLEN")
            .arg(self.key("paused"));

        match self.layout {
            KeyLayout::Legacy => {
                let (waiting, active, completed, failed, delayed, paused): (
                    u64,
                    u64,
                    u64,
                    u64,
                    u64,
                    u64,
                ) = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
                Ok(JobCounts {
                    waiting,
                    active,
                    completed,
                    failed,
                    delayed,
                    paused,
                })
            }
            KeyLayout::Modern => {
                pipe.cmd("ZCARD").arg(self.key("prioritized"));
                let (waiting, active, completed, failed, delayed, paused, prioritized): (
                    u64,
                    u64,
                    u64,
                    u64,
                    u64,
                    u64,
                    u64,
                ) = pipe.query_async(&mut conn).await.map_err(map_redis_error)?;
                Ok(JobCounts {
                    waiting: waiting + prioritized,
                    active,
                    completed,
                    failed,
                    delayed,
                    paused,
                })
            }
        }
    }
}

/// Builds Redis-backed queue clients for both engine variants
#[derive(Debug, Default, Clone, Copy)]
pub struct RedisQueueClientFactory;

impl RedisQueueClientFactory {
    pub fn new() -> Self {
        Self
    }

    fn build(
        &self,
        queue: &str,
        connection: &ConnectionParams,
        key_prefix: &str,
        layout: KeyLayout,
    ) -> Result<Arc<dyn QueueClient>> {
        if queue.is_empty() {
            return Err(construction_failed(queue, "queue name must not be empty"));
        }
        let info = connection_info(connection).map_err(|e| construction_failed(queue, e))?;
        let client = redis::Client::open(info).map_err(|e| construction_failed(queue, e))?;

        Ok(Arc::new(RedisQueueClient::new(queue, key_prefix, layout, client)))
    }
}

impl QueueClientFactory for RedisQueueClientFactory {
    // Bull always reads under its built-in prefix
    fn legacy(&self, queue: &str, connection: &ConnectionParams) -> Result<Arc<dyn QueueClient>> {
        self.build(queue, connection, DEFAULT_KEY_PREFIX, KeyLayout::Legacy)
    }

    fn modern(&self, queue: &str, options: &ModernQueueOptions) -> Result<Arc<dyn QueueClient>> {
        let prefix = options.prefix.as_deref().unwrap_or(DEFAULT_KEY_PREFIX);
        self.build(queue, &options.connection, prefix, KeyLayout::Modern)
    }
}

fn construction_failed(queue: &str, reason: impl ToString) -> AppError {
    AppError::AdapterConstructionFailed {
        queue: queue.to_string(),
        reason: reason.to_string(),
    }
}
