// Adapter Factory - one queue handle per identifier
//
// Each engine variant is its own builder; adding a variant means adding a
// builder and a match arm in `builder_for`, nothing else.

use crate::domain::{
    ConnectionParams, EngineConfig, EngineVariant, HandleOptions, ModernQueueOptions, QueueHandle,
    QueueId,
};
use crate::error::{AppError, Result};
use crate::port::QueueClientFactory;
use std::sync::Arc;

/// Builds a monitoring handle for one queue
pub trait HandleBuilder: Send + Sync {
    fn variant(&self) -> EngineVariant;

    /// Build the handle for `queue`
    ///
    /// # Errors
    /// - AppError::AdapterConstructionFailed if the engine client rejects it
    fn build(&self, queue: &str) -> Result<QueueHandle>;

    /// Build handles for every queue, preserving order
    ///
    /// All-or-nothing: the first failure aborts.
    fn build_all(&self, queues: &[QueueId]) -> Result<Vec<QueueHandle>> {
        queues.iter().map(|queue| self.build(queue)).collect()
    }
}

/// Legacy engine: the client gets the whole connection bundle
pub struct LegacyHandleBuilder {
    connection: ConnectionParams,
    clients: Arc<dyn QueueClientFactory>,
}

impl LegacyHandleBuilder {
    pub fn new(connection: ConnectionParams, clients: Arc<dyn QueueClientFactory>) -> Self {
        Self {
            connection,
            clients,
        }
    }
}

impl HandleBuilder for LegacyHandleBuilder {
    fn variant(&self) -> EngineVariant {
        EngineVariant::Legacy
    }

    fn build(&self, queue: &str) -> Result<QueueHandle> {
        let client = self
            .clients
            .legacy(queue, &self.connection)
            .map_err(|e| construction_failed(queue, e))?;

        Ok(QueueHandle::new(
            queue,
            EngineVariant::Legacy,
            HandleOptions::Legacy(self.connection.clone()),
            client,
        ))
    }
}

/// Modern engine: connection options plus the configured prefix, if any
pub struct ModernHandleBuilder {
    options: ModernQueueOptions,
    clients: Arc<dyn QueueClientFactory>,
}

impl ModernHandleBuilder {
    pub fn new(
        connection: ConnectionParams,
        prefix: Option<String>,
        clients: Arc<dyn QueueClientFactory>,
    ) -> Self {
        Self {
            options: ModernQueueOptions { connection, prefix },
            clients,
        }
    }
}

impl HandleBuilder for ModernHandleBuilder {
    fn variant(&self) -> EngineVariant {
        EngineVariant::Modern
    }

    fn build(&self, queue: &str) -> Result<QueueHandle> {
        let client = self
            .clients
            .modern(queue, &self.options)
            .map_err(|e| construction_failed(queue, e))?;

        Ok(QueueHandle::new(
            queue,
            EngineVariant::Modern,
            HandleOptions::Modern(self.options.clone()),
            client,
        ))
    }
}

/// Select the builder for the configured engine variant
pub fn builder_for(
    config: &EngineConfig,
    clients: Arc<dyn QueueClientFactory>,
) -> Arc<dyn HandleBuilder> {
    match config.variant {
        EngineVariant::Legacy => Arc::new(LegacyHandleBuilder::new(config.connection.clone(), clients)),
        EngineVariant::Modern => Arc::new(ModernHandleBuilder::new(
            config.connection.clone(),
            config.key_prefix.clone(),
            clients,
        )),
    }
}

fn construction_failed(queue: &str, err: AppError) -> AppError {
    match err {
        e @ AppError::AdapterConstructionFailed { .. } => e,
        other => AppError::AdapterConstructionFailed {
            queue: queue.to_string(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::queue_client::mocks::MockQueueClientFactory;

    fn queues(names: &[&str]) -> Vec<QueueId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_modern_handles_carry_prefix() {
        let clients = Arc::new(MockQueueClientFactory::new());
        let config = EngineConfig::new(EngineVariant::Modern, ConnectionParams::default())
            .with_key_prefix("myapp");
        let builder = builder_for(&config, clients.clone());

        let handles = builder.build_all(&queues(&["a", "b", "c"])).unwrap();

        assert_eq!(handles.len(), 3);
        for handle in &handles {
            assert_eq!(handle.variant(), EngineVariant::Modern);
            assert_eq!(handle.options().prefix(), Some("myapp"));
            assert_eq!(handle.client().key_prefix(), "myapp");
        }
        let names: Vec<&str> = handles.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(clients.calls().iter().all(|c| c.prefix.as_deref() == Some("myapp")));
    }

    #[test]
    fn test_modern_without_prefix_omits_field() {
        let clients = Arc::new(MockQueueClientFactory::new());
        let config = EngineConfig::new(EngineVariant::Modern, ConnectionParams::default());
        let handle = builder_for(&config, clients).build("emails").unwrap();

        assert_eq!(handle.options().prefix(), None);
    }

    #[test]
    fn test_legacy_handles_have_no_prefix_field() {
        let clients = Arc::new(MockQueueClientFactory::new());
        let connection = ConnectionParams::new("redis.internal", 6380)
            .with_db(2)
            .with_password("secret")
            .with_tls(true);
        let config = EngineConfig::new(EngineVariant::Legacy, connection.clone())
            .with_key_prefix("ignored-by-legacy");
        let builder = builder_for(&config, clients.clone());

        let handle = builder.build("emails").unwrap();

        assert_eq!(builder.variant(), EngineVariant::Legacy);
        assert_eq!(handle.options().prefix(), None);
        assert_eq!(handle.options(), &HandleOptions::Legacy(connection));
        assert_eq!(clients.calls()[0].prefix, None);
    }

    #[test]
    fn test_construction_failure_aborts_build_all() {
        let clients = Arc::new(MockQueueClientFactory::new());
        clients.reject_queue("b");
        let config = EngineConfig::new(EngineVariant::Modern, ConnectionParams::default());

        let err = builder_for(&config, clients.clone())
            .build_all(&queues(&["a", "b", "c"]))
            .unwrap_err();

        assert!(matches!(err, AppError::AdapterConstructionFailed { ref queue, .. } if queue == "b"));
        assert_eq!(clients.calls().len(), 2);
    }
}
