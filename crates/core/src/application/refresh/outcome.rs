// Refresh cycle states and outcomes

use crate::domain::QueueId;
use crate::error::AppError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Refresh cycle state machine
///
/// `Idle -> Connecting -> Scanning -> Extracting -> Building -> Publishing
/// -> Disconnecting -> Idle`. `Failed` is entered for the rest of a cycle
/// that aborted; the next cycle starts from `Idle` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshState {
    Idle,
    Connecting,
    Scanning,
    Extracting,
    Building,
    Publishing,
    Disconnecting,
    Failed,
}

impl RefreshState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshState::Idle => "IDLE",
            RefreshState::Connecting => "CONNECTING",
            RefreshState::Scanning => "SCANNING",
            RefreshState::Extracting => "EXTRACTING",
            RefreshState::Building => "BUILDING",
            RefreshState::Publishing => "PUBLISHING",
            RefreshState::Disconnecting => "DISCONNECTING",
            RefreshState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a cycle that reached the publish step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub generation: u64,
    pub queues: Vec<QueueId>,
    pub scanned_keys: usize,
    pub malformed_keys: usize,
    pub duration_ms: u64,
    pub finished_at_ms: i64,
}

/// A cycle that aborted; the registry was left untouched
#[derive(Debug, Clone)]
pub struct RefreshFailure {
    pub generation: u64,
    /// State the cycle was in when it failed
    pub stage: RefreshState,
    pub error: Arc<AppError>,
    pub finished_at_ms: i64,
}

/// Result of one refresh cycle, shared by every trigger that joined it
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// New handle set is visible to readers
    Published(RefreshReport),
    /// A newer generation was already published; this result was dropped
    Stale(RefreshReport),
    /// Cycle aborted; readers keep the previous handle set
    Failed(RefreshFailure),
}

impl RefreshOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            RefreshOutcome::Published(report) | RefreshOutcome::Stale(report) => report.generation,
            RefreshOutcome::Failed(failure) => failure.generation,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, RefreshOutcome::Published(_))
    }

    pub fn finished_at_ms(&self) -> i64 {
        match self {
            RefreshOutcome::Published(report) | RefreshOutcome::Stale(report) => {
                report.finished_at_ms
            }
            RefreshOutcome::Failed(failure) => failure.finished_at_ms,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            RefreshOutcome::Failed(failure) => Some(failure.error.as_ref()),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Published(_) => "PUBLISHED",
            RefreshOutcome::Stale(_) => "STALE",
            RefreshOutcome::Failed(_) => "FAILED",
        }
    }
}
