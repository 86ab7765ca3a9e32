// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed key '{key}': {reason}")]
    MalformedKey { key: String, reason: String },

    #[error("Invalid queue engine variant: {0} (expected BULL or BULLMQ)")]
    InvalidVariant(String),

    #[error("Invalid queue name '{queue}': {reason}")]
    InvalidQueueId { queue: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
