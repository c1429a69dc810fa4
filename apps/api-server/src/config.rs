//! Server configuration.
//!
//! Loaded in three layers, each overriding the one before:
//!
//! 1. Built-in defaults ([`ServerConfig::default`])
//! 2. `server.toml`, from an explicit path or the platform config dir
//! 3. `PHARMAPOS_*` environment variables
//!
//! | Variable | Field |
//! |---|---|
//! | `PHARMAPOS_BIND_ADDR` | `bind_addr` |
//! | `PHARMAPOS_PORT` | `port` |
//! | `PHARMAPOS_DB_PATH` | `database_path` |
//! | `PHARMAPOS_MAX_CONNECTIONS` | `max_connections` |
//! | `PHARMAPOS_LOG` | `log_filter` |
//! | `PHARMAPOS_CORS_ORIGIN` | `cors_origin` |

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use pharmapos_db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the config file inside the platform config dir.
pub const CONFIG_FILE_NAME: &str = "server.toml";

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on
    pub bind_addr: String,

    /// TCP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Browser origin allowed by CORS. `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 3000,
            database_path: PathBuf::from("pharmapos.db"),
            max_connections: 5,
            log_filter: "info,pharmapos_server=debug,pharmapos_db=debug".to_string(),
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    /// Loads defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist. Without one, the platform config
    /// file is read only if present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `PHARMAPOS_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PHARMAPOS_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("PHARMAPOS_PORT") {
            self.port = parse_var("PHARMAPOS_PORT", &value)?;
        }
        if let Some(value) = lookup("PHARMAPOS_DB_PATH") {
            self.database_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("PHARMAPOS_MAX_CONNECTIONS") {
            self.max_connections = parse_var("PHARMAPOS_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("PHARMAPOS_LOG") {
            self.log_filter = value;
        }
        if let Some(value) = lookup("PHARMAPOS_CORS_ORIGIN") {
            self.cors_origin = Some(value).filter(|origin| !origin.trim().is_empty());
        }
        Ok(())
    }

    /// Rejects settings the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be 0".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database_path must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid("max_connections must be at least 1".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Address the listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidValue {
            key: "bind_addr".to_string(),
            value: addr,
        })
    }

    /// Database settings derived from this config.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

/// `<config dir>/pharmapos/server.toml` for the current platform.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "pharmapos", "pharmapos")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
