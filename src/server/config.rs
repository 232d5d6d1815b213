//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::parser::DEFAULT_MAX_HEAD_SIZE;
use crate::server::error::Error;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The directory files are served from.
    pub root: PathBuf,
    /// The document served for `/`.
    pub index: String,
    /// The maximum number of connections handled at once.
    pub max_connections: usize,
    /// The maximum size of a request head, in bytes.
    pub max_head_size: usize,
    /// Seconds to wait for in-flight connections on shutdown.
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 9000)),
            root: PathBuf::from("www"),
            index: "index.html".to_string(),
            max_connections: 1024,
            max_head_size: DEFAULT_MAX_HEAD_SIZE,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_connections == 0 {
            return Err(Error::ConfigError("max_connections must be at least 1".to_string()));
        }
        if self.max_head_size == 0 {
            return Err(Error::ConfigError("max_head_size must be at least 1".to_string()));
        }
        if self.index.is_empty() || self.index.contains('/') {
            return Err(Error::ConfigError(format!("invalid index document: {:?}", self.index)));
        }
        Ok(())
    }

    /// The graceful shutdown wait as a `Duration`.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}
