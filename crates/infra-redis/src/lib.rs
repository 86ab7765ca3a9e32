// Bull Board Infrastructure - Redis Adapter
// Implements: KeyStore, QueueClientFactory

mod connection;
mod key_store;
mod queue_client;

pub use connection::{connection_info, map_redis_error};
pub use key_store::{RedisKeySession, RedisKeyStore};
pub use queue_client::{KeyLayout, RedisQueueClient, RedisQueueClientFactory};

// Note: redis::RedisError conversion is handled by `map_redis_error`
// due to Rust's orphan rules (cannot implement From<redis::RedisError> for AppError here)
