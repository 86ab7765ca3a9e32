// Redis Connection Setup

use bullboard_core::domain::ConnectionParams;
use bullboard_core::error::AppError;
use redis::{ConnectionInfo, IntoConnectionInfo, RedisError};

/// Build redis connection info from connection parameters
///
/// TLS selects the `rediss://` scheme; the password never appears in the URL.
pub fn connection_info(params: &ConnectionParams) -> Result<ConnectionInfo, AppError> {
    if params.host.is_empty() {
        return Err(AppError::Config("redis host must not be empty".to_string()));
    }

    let scheme = if params.tls { "rediss" } else { "redis" };
    // Bare IPv6 literals need brackets in the URL; bracketed ones pass through
    let host = if params.host.contains(':') && !params.host.starts_with('[') {
        format!("[{}]", params.host)
    } else {
        params.host.clone()
    };
    let url = format!("{}://{}:{}/{}", scheme, host, params.port, params.db);

    let mut info = url
        .as_str()
        .into_connection_info()
        .map_err(|e| AppError::Config(format!("invalid redis address {}: {}", url, e)))?;
    info.redis.password = params.password.clone();

    Ok(info)
}

/// Convert redis::RedisError to AppError with structured information
pub fn map_redis_error(err: RedisError) -> AppError {
    if err.is_timeout() {
        AppError::StoreUnavailable(format!("Redis timeout: {}", err))
    } else if err.is_connection_refusal() {
        AppError::StoreUnavailable(format!("Redis connection refused: {}", err))
    } else if err.is_connection_dropped() || err.is_io_error() {
        AppError::StoreUnavailable(format!("Redis I/O error: {}", err))
    } else {
        // Protocol, auth, and command errors
        AppError::StoreUnavailable(format!("Redis error [{:?}]: {}", err.kind(), err))
    }
}
