//! Daemon settings
//!
//! Defaults overlaid by environment variables, e.g.
//!
//! ```text
//! REDIS_HOST=redis.internal REDIS_PORT=6380 BULL_VERSION=BULL ./bullboard
//! ```

use anyhow::{bail, Context, Result};
use bullboard_api_rpc::RpcServerConfig;
use bullboard_core::application::constants::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SCAN_COUNT};
use bullboard_core::application::DiscoveryConfig;
use bullboard_core::domain::{ConnectionParams, EngineConfig, EngineVariant};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,
    pub redis_password: Option<String>,
    pub redis_use_tls: bool,
    pub bull_prefix: String,
    pub bull_version: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub connect_timeout_ms: u64,
    pub scan_count: usize,
    pub bullboard_log_format: String,
    pub bullboard_log_dir: Option<String>,
}

impl Settings {
    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().try_parsing(true))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("redis_host", "localhost")?
            .set_default("redis_port", 6379)?
            .set_default("redis_db", 0)?
            .set_default("redis_use_tls", false)?
            .set_default("bull_prefix", "bull")?
            .set_default("bull_version", "BULLMQ")?
            .set_default("rpc_host", "127.0.0.1")?
            .set_default("rpc_port", 3000)?
            .set_default("connect_timeout_ms", DEFAULT_CONNECT_TIMEOUT.as_millis() as i64)?
            .set_default("scan_count", DEFAULT_SCAN_COUNT as i64)?
            .set_default("bullboard_log_format", "pretty")?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Queue engine configuration (variant, connection, key prefix)
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let variant: EngineVariant = self
            .bull_version
            .parse()
            .context("BULL_VERSION must be BULL or BULLMQ")?;

        if self.redis_db < 0 {
            bail!("REDIS_DB must not be negative (got {})", self.redis_db);
        }

        let mut connection = ConnectionParams::new(self.redis_host.clone(), self.redis_port)
            .with_db(self.redis_db)
            .with_tls(self.redis_use_tls);
        if let Some(password) = self.redis_password.as_deref().filter(|p| !p.is_empty()) {
            connection = connection.with_password(password);
        }

        Ok(EngineConfig::new(variant, connection).with_key_prefix(self.bull_prefix.clone()))
    }

    pub fn discovery_config(&self, engine: &EngineConfig) -> Result<DiscoveryConfig> {
        // A zero timeout would fail every connect attempt
        if self.connect_timeout_ms == 0 {
            bail!("CONNECT_TIMEOUT_MS must be greater than zero");
        }

        Ok(DiscoveryConfig::new(engine.namespace())
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms)))
    }

    pub fn rpc_config(&self) -> RpcServerConfig {
        RpcServerConfig {
            host: self.rpc_host.clone(),
            port: self.rpc_port,
        }
    }

    pub fn log_format(&self) -> LogFormat {
        if self.bullboard_log_format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.bullboard_log_dir
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
    }
}
