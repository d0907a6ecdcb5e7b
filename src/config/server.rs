use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use super::StorageConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Port of the file proxy listener.
    pub file_port: u16,
    pub database: PathBuf,
    pub jwt_secret: String,
    /// Keys accepted in `X-API-KEY` by the file proxy.
    pub api_keys: Vec<String>,
    /// Zero disables the loop.
    pub token_sweep_interval: Duration,
    /// Zero disables the loop.
    pub notification_sweep_interval: Duration,
    pub storage: Option<StorageConfig>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn file_socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.file_port).parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(Error::Config("JWT secret must not be empty".to_string()));
        }
        if self.port == self.file_port && self.storage.is_some() {
            return Err(Error::Config(
                "API port and file proxy port must differ".to_string(),
            ));
        }
        if self.storage.is_some() && self.api_keys.is_empty() {
            return Err(Error::Config(
                "file proxy requires at least one API key".to_string(),
            ));
        }
        Ok(())
    }
}

/// Splits a comma separated key list, dropping blanks.
#[must_use]
pub fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            file_port: 8081,
            database: PathBuf::from("./data/assetman.db"),
            jwt_secret: String::new(),
            api_keys: Vec::new(),
            token_sweep_interval: Duration::from_secs(60 * 60),
            notification_sweep_interval: Duration::from_secs(24 * 60 * 60),
            storage: None,
        }
    }
}
