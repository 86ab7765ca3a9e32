//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use bullboard_core::domain::{JobCounts, QueueHandle};
use serde::{Deserialize, Serialize};

/// queues.list.v1 - Refresh and list discovered queues
#[derive(Debug, Default, Deserialize)]
pub struct ListQueuesRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueInfo {
    pub name: String,
    pub variant: String,
    /// Explicit prefix option (modern engine only)
    pub prefix: Option<String>,
    /// Prefix the queue's keys actually live under
    pub key_prefix: String,
}

impl From<&QueueHandle> for QueueInfo {
    fn from(handle: &QueueHandle) -> Self {
        Self {
            name: handle.name().to_string(),
            variant: handle.variant().to_string(),
            prefix: handle.options().prefix().map(str::to_string),
            key_prefix: handle.client().key_prefix().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQueuesResponse {
    pub generation: u64,
    /// False when the refresh failed and the previous list is served
    pub refreshed: bool,
    pub refresh_error: Option<String>,
    pub queues: Vec<QueueInfo>,
}

/// queues.counts.v1 - Refresh and report job counts
#[derive(Debug, Default, Deserialize)]
pub struct QueueCountsRequest {
    /// Restrict to one queue
    #[serde(default)]
    pub queue: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueCounts {
    pub name: String,
    pub counts: Option<JobCounts>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueCountsResponse {
    pub generation: u64,
    pub refreshed: bool,
    pub queues: Vec<QueueCounts>,
}

/// admin.status.v1 - Discovery engine status
#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub state: String,
    pub refreshing: bool,
    pub generation: u64,
    pub queue_count: usize,
    pub namespace: String,
    pub variant: String,
    pub last_outcome: Option<String>,
    pub last_error: Option<String>,
    pub last_refresh_at_ms: Option<i64>,
    pub uptime_seconds: u64,
}
