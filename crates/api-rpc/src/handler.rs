//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    ListQueuesRequest, ListQueuesResponse, QueueCounts, QueueCountsRequest, QueueCountsResponse,
    QueueInfo, StatusRequest, StatusResponse,
};
use bullboard_core::application::{RefreshCoordinator, RefreshOutcome};
use bullboard_core::domain::{validate_queue_id, EngineVariant};
use bullboard_core::error::AppError;
use futures::future::join_all;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    coordinator: Arc<RefreshCoordinator>,
    variant: EngineVariant,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(coordinator: Arc<RefreshCoordinator>, variant: EngineVariant) -> Self {
        Self {
            coordinator,
            variant,
            start_time: std::time::Instant::now(),
        }
    }

    /// queues.list.v1
    pub async fn list_queues(
        &self,
        _params: ListQueuesRequest,
    ) -> Result<ListQueuesResponse, ErrorObjectOwned> {
        let outcome = self.coordinator.trigger().await;
        let snapshot = self.coordinator.registry().snapshot();

        Ok(ListQueuesResponse {
            generation: snapshot.generation,
            refreshed: outcome.is_published(),
            refresh_error: outcome.error().map(|e| e.to_string()),
            queues: snapshot.handles.iter().map(QueueInfo::from).collect(),
        })
    }

    /// queues.counts.v1
    pub async fn queue_counts(
        &self,
        params: QueueCountsRequest,
    ) -> Result<QueueCountsResponse, ErrorObjectOwned> {
        if let Some(queue) = &params.queue {
            validate_queue_id(queue).map_err(|e| to_rpc_error(e.into()))?;
        }

        let outcome = self.coordinator.trigger().await;
        let snapshot = self.coordinator.registry().snapshot();

        let handles: Vec<_> = match &params.queue {
            Some(queue) => {
                let handle = snapshot.find(queue).ok_or_else(|| {
                    to_rpc_error(AppError::NotFound(format!("Queue {} not found", queue)))
                })?;
                vec![handle]
            }
            None => snapshot.handles.iter().collect(),
        };

        // Per-queue failures are reported inline, not as an RPC error
        let queues = join_all(handles.into_iter().map(|handle| async move {
            match handle.client().job_counts().await {
                Ok(counts) => QueueCounts {
                    name: handle.name().to_string(),
                    counts: Some(counts),
                    error: None,
                },
                Err(e) => {
                    debug!(queue = %handle.name(), error = %e, "Job count lookup failed");
                    QueueCounts {
                        name: handle.name().to_string(),
                        counts: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        }))
        .await;

        Ok(QueueCountsResponse {
            generation: snapshot.generation,
            refreshed: outcome.is_published(),
            queues,
        })
    }

    /// admin.status.v1
    pub async fn status(&self, _params: StatusRequest) -> Result<StatusResponse, ErrorObjectOwned> {
        let snapshot = self.coordinator.registry().snapshot();
        let last = self.coordinator.last_outcome();

        Ok(StatusResponse {
            state: self.coordinator.state().to_string(),
            refreshing: self.coordinator.is_refreshing(),
            generation: snapshot.generation,
            queue_count: snapshot.len(),
            namespace: self.coordinator.namespace().to_string(),
            variant: self.variant.to_string(),
            last_outcome: last.as_ref().map(|o| o.label().to_string()),
            last_error: last
                .as_ref()
                .and_then(RefreshOutcome::error)
                .map(|e| e.to_string()),
            last_refresh_at_ms: last.as_ref().map(RefreshOutcome::finished_at_ms),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        })
    }
}
