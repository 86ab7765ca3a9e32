// Queue Engine Client Port
// The engine adapters the discovery engine instantiates but never inspects

use crate::domain::{ConnectionParams, JobCounts, ModernQueueOptions};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Introspection capability for one queue
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Queue name the client is bound to
    fn name(&self) -> &str;

    /// Key prefix the client reads under
    fn key_prefix(&self) -> &str;

    /// Current job counts per state
    async fn job_counts(&self) -> Result<JobCounts>;
}

/// Queue engine client constructors
///
/// Implementations:
/// - RedisQueueClientFactory: clients reading Bull / BullMQ keys from Redis
pub trait QueueClientFactory: Send + Sync {
    /// Legacy engine client: identifier plus the full connection bundle
    ///
    /// # Errors
    /// - AppError::AdapterConstructionFailed if the client rejects the configuration
    fn legacy(&self, queue: &str, connection: &ConnectionParams) -> Result<Arc<dyn QueueClient>>;

    /// Modern engine client: identifier plus options carrying an optional prefix
    ///
    /// # Errors
    /// - AppError::AdapterConstructionFailed if the client rejects the configuration
    fn modern(&self, queue: &str, options: &ModernQueueOptions) -> Result<Arc<dyn QueueClient>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{EngineVariant, DEFAULT_KEY_PREFIX};
    use crate::error::AppError;
    use std::sync::Mutex;

    /// Mock queue client with fixed counts
    pub struct MockQueueClient {
        name: String,
        key_prefix: String,
        counts: Result<JobCounts>,
    }
    impl MockQueueClient {
        pub fn new(name: impl Into<String>, key_prefix: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                key_prefix: key_prefix.into(),
                counts: Ok(JobCounts::default()),
            }
        }
        pub fn with_counts(mut self, counts: JobCounts) -> Self {
            self.counts = Ok(counts);
            self
        }
        pub fn failing(mut self, message: impl Into<String>) -> Self {
            self.counts = Err(AppError::StoreUnavailable(message.into()));
            self
        }
    }
    #[async_trait]
    impl QueueClient for MockQueueClient {
        fn name(&self) -> &str {
            &self.name
        }
        fn key_prefix(&self) -> &str {
            &self.key_prefix
        }
        async fn job_counts(&self) -> Result<JobCounts> {
            match &self.counts {
                Ok(counts) => Ok(*counts),
                Err(e) => Err(AppError::StoreUnavailable(e.to_string())),
            }
        }
    }

    /// Recorded constructor call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ConstructorCall {
        pub variant: EngineVariant,
        pub queue: String,
        pub prefix: Option<String>,
    }

    /// Mock factory recording every constructor call
    #[derive(Default)]
    pub struct MockQueueClientFactory {
        calls: Mutex<Vec<ConstructorCall>>,
        reject: Mutex<Option<String>>,
        counts: Mutex<JobCounts>,
    }
    impl MockQueueClientFactory {
        pub fn new() -> Self {
            Self::default()
        }
        /// Reject construction for one queue name
        pub fn reject_queue(&self, queue: impl Into<String>) {
            *self.reject.lock().unwrap() = Some(queue.into());
        }
        /// Counts reported by every client built from now on
        pub fn set_counts(&self, counts: JobCounts) {
            *self.counts.lock().unwrap() = counts;
        }
        pub fn calls(&self) -> Vec<ConstructorCall> {
            self.calls.lock().unwrap().clone()
        }
        fn build(
            &self,
            variant: EngineVariant,
            queue: &str,
            prefix: Option<&str>,
        ) -> Result<Arc<dyn QueueClient>> {
            self.calls.lock().unwrap().push(ConstructorCall {
                variant,
                queue: queue.to_string(),
                prefix: prefix.map(str::to_string),
            });
            if self.reject.lock().unwrap().as_deref() == Some(queue) {
                return Err(AppError::AdapterConstructionFailed {
                    queue: queue.to_string(),
                    reason: "rejected by mock".to_string(),
                });
            }
            let counts = *self.counts.lock().unwrap();
            Ok(Arc::new(
                MockQueueClient::new(queue, prefix.unwrap_or(DEFAULT_KEY_PREFIX))
                    .with_counts(counts),
            ))
        }
    }
    impl QueueClientFactory for MockQueueClientFactory {
        fn legacy(&self, queue: &str, _connection: &ConnectionParams) -> Result<Arc<dyn QueueClient>> {
            self.build(EngineVariant::Legacy, queue, None)
        }
        fn modern(&self, queue: &str, options: &ModernQueueOptions) -> Result<Arc<dyn QueueClient>> {
            self.build(EngineVariant::Modern, queue, options.prefix.as_deref())
        }
    }
}
