// Queue Domain Model

use super::engine::{ConnectionParams, EngineVariant};
use crate::port::QueueClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Queue identifier
pub type QueueId = String;

/// Connection options for the modern engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModernQueueOptions {
    pub connection: ConnectionParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// Options a handle was constructed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOptions {
    /// Full connection bundle; the legacy client prefixes keys itself
    Legacy(ConnectionParams),
    Modern(ModernQueueOptions),
}

impl HandleOptions {
    pub fn connection(&self) -> &ConnectionParams {
        match self {
            HandleOptions::Legacy(connection) => connection,
            HandleOptions::Modern(options) => &options.connection,
        }
    }

    /// Explicit prefix field (never set for legacy handles)
    pub fn prefix(&self) -> Option<&str> {
        match self {
            HandleOptions::Legacy(_) => None,
            HandleOptions::Modern(options) => options.prefix.as_deref(),
        }
    }
}

/// Monitoring handle bound to one queue
///
/// Built fresh on every refresh cycle. The client is an opaque
/// introspection capability; cloning shares it.
#[derive(Clone)]
pub struct QueueHandle {
    name: QueueId,
    variant: EngineVariant,
    options: HandleOptions,
    client: Arc<dyn QueueClient>,
}

impl QueueHandle {
    pub fn new(
        name: impl Into<QueueId>,
        variant: EngineVariant,
        options: HandleOptions,
        client: Arc<dyn QueueClient>,
    ) -> Self {
        Self {
            name: name.into(),
            variant,
            options,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variant(&self) -> EngineVariant {
        self.variant
    }

    pub fn options(&self) -> &HandleOptions {
        &self.options
    }

    pub fn client(&self) -> &Arc<dyn QueueClient> {
        &self.client
    }
}

impl fmt::Debug for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueHandle")
            .field("name", &self.name)
            .field("variant", &self.variant)
            .field("options", &self.options)
            .field("key_prefix", &self.client.key_prefix())
            .finish()
    }
}

/// Job counts per state, as reported by a queue client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub waiting: u64,
    pub active: u64,
    pub completed: u64,
    pub failed: u64,
    pub delayed: u64,
    pub paused: u64,
}

impl JobCounts {
    pub fn total(&self) -> u64 {
        self.waiting + self.active + self.completed + self.failed + self.delayed + self.paused
    }
}
