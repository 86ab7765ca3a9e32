// Queue Engine Configuration

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key prefix the legacy engine uses when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "bull";

/// Queue engine variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineVariant {
    /// Bull (v3 and earlier)
    Legacy,
    /// BullMQ
    Modern,
}

impl EngineVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineVariant::Legacy => "BULL",
            EngineVariant::Modern => "BULLMQ",
        }
    }
}

impl fmt::Display for EngineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BULL" | "LEGACY" => Ok(EngineVariant::Legacy),
            "BULLMQ" | "MODERN" => Ok(EngineVariant::Modern),
            _ => Err(DomainError::InvalidVariant(s.to_string())),
        }
    }
}

/// Connection parameters for the key-value store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub db: i64,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub tls: bool,
}

impl ConnectionParams {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            db: 0,
            password: None,
            tls: false,
        }
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self::new("localhost", 6379)
    }
}

// Password never reaches logs
impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("tls", &self.tls)
            .finish()
    }
}

/// Process-wide queue engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub variant: EngineVariant,
    pub connection: ConnectionParams,
    /// Explicit key prefix (None = engine default)
    pub key_prefix: Option<String>,
}

impl EngineConfig {
    pub fn new(variant: EngineVariant, connection: ConnectionParams) -> Self {
        Self {
            variant,
            connection,
            key_prefix: None,
        }
    }

    /// Set the key prefix; an empty prefix counts as not configured
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.key_prefix = if prefix.is_empty() { None } else { Some(prefix) };
        self
    }

    /// Key namespace scanned for queues
    pub fn namespace(&self) -> &str {
        self.key_prefix.as_deref().unwrap_or(DEFAULT_KEY_PREFIX)
    }
}
