// Domain Layer - Pure types and naming rules

pub mod engine;
pub mod error;
pub mod key;
pub mod queue;

// Re-exports
pub use engine::{ConnectionParams, EngineConfig, EngineVariant, DEFAULT_KEY_PREFIX};
pub use error::DomainError;
pub use key::{namespace_pattern, queue_id_from_key, validate_queue_id};
pub use queue::{HandleOptions, JobCounts, ModernQueueOptions, QueueHandle, QueueId};
