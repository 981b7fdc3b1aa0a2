//! Service configuration.
//!
//! ```text
//! config file (TOML)
//!     → Config::from_toml_str   (serde: syntax, defaults)
//!     → Config::validate        (semantics, every problem at once)
//!     → Config                  (immutable from here on)
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:3000"
//! log_filter = "info"
//!
//! [database]
//! user = "app"
//! pass = "secret"
//! host = "db.internal"
//! db_name = "orders"
//!
//! [cache]
//! addr = "cache.internal:6379"
//!
//! [storage]
//! endpoint = "oss-cn-hangzhou.aliyuncs.com"
//! access_key_id = "id"
//! access_key_secret = "secret"
//! bucket = "uploads"
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::store::{CacheOptions, DbConfig, Driver, ObjectStoreOptions};

/// Root configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: Option<DbConfig>,
    pub cache: Option<CacheOptions>,
    pub storage: Option<ObjectStoreOptions>,
}

/// `[server]`
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address, `host:port`.
    pub addr: String,
    /// Default log filter, used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: "0.0.0.0:3000".to_owned(), log_filter: "info".to_owned() }
    }
}

/// A single semantic problem in an otherwise well-formed file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invalid {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid listen address `{0}`")]
    InvalidAddr(String),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<Invalid>),
}

fn join(problems: &[Invalid]) -> String {
    problems.iter().map(Invalid::to_string).collect::<Vec<_>>().join(", ")
}

impl Config {
    /// Reads, parses and validates the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section, reporting all problems together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.server.addr.parse::<SocketAddr>().is_err() {
            problems.push(invalid("server.addr", format!("`{}` is not host:port", self.server.addr)));
        }

        if let Some(db) = &self.database {
            if db.db_name.is_empty() {
                problems.push(invalid("database.db_name", "must not be empty"));
            }
            if db.driver == Driver::Mysql && db.host.is_empty() {
                problems.push(invalid("database.host", "required for the mysql driver"));
            }
            if db.port == 0 {
                problems.push(invalid("database.port", "must be non-zero"));
            }
        }

        if let Some(cache) = &self.cache {
            if cache.addr.is_empty() {
                problems.push(invalid("cache.addr", "must not be empty"));
            }
            if cache.pool_size == 0 {
                problems.push(invalid("cache.pool_size", "must be non-zero"));
            }
            if cache.min_idle_conns > cache.pool_size {
                problems.push(invalid("cache.min_idle_conns", "must not exceed pool_size"));
            }
        }

        if let Some(storage) = &self.storage {
            for (field, value) in [
                ("storage.endpoint", &storage.endpoint),
                ("storage.access_key_id", &storage.access_key_id),
                ("storage.access_key_secret", &storage.access_key_secret),
                ("storage.bucket", &storage.bucket),
            ] {
                if value.is_empty() {
                    problems.push(invalid(field, "must not be empty"));
                }
            }
        }

        if problems.is_empty() { Ok(()) } else { Err(ConfigError::Validation(problems)) }
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> Invalid {
    Invalid { field, message: message.into() }
}
