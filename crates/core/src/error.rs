// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Adapter construction failed for queue '{queue}': {reason}")]
    AdapterConstructionFailed { queue: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Short machine-readable kind, used in logs and status reports
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Domain(_) => "domain",
            AppError::StoreUnavailable(_) => "store_unavailable",
            AppError::AdapterConstructionFailed { .. } => "adapter_construction_failed",
            AppError::Config(_) => "config",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

// Note: redis::RedisError conversion is handled in infra-redis crate
// by converting to AppError::StoreUnavailable(String)
