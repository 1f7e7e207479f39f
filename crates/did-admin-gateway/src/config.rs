//! Gateway configuration types.
//!
//! This module defines configuration structures for the HTTP gateway and
//! the storage backend behind it.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `STORAGE_BACKEND` named something other than `memory` or `rocksdb`.
    #[error("unknown storage backend: {0}")]
    UnknownBackend(String),

    /// The RocksDB backend was selected without a data directory.
    #[error("the rocksdb backend requires DATA_DIR")]
    MissingDataDir,
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Allowed CORS origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Where records are persisted.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    const fn default_max_body() -> usize {
        10 * 1024 * 1024 // uploads up to 10 MB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    ///
    /// Reads `LISTEN_ADDR`, `CORS_ORIGINS` (comma separated),
    /// `STORAGE_BACKEND` and `DATA_DIR`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownBackend` for an unrecognized backend and
    /// `ConfigError::MissingDataDir` when `rocksdb` is chosen without
    /// `DATA_DIR`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            config.storage.backend = backend.parse()?;
        }
        config.storage.data_dir = lookup("DATA_DIR")
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from);

        config.storage.validate()?;
        Ok(config)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origins: vec!["*".to_string()],
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            storage: StorageConfig::default(),
        }
    }
}

/// Persistence backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart.
    #[default]
    Memory,
    /// RocksDB under `data_dir`.
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// RocksDB directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Check that the backend has what it needs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingDataDir` for RocksDB without a directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StorageBackend::RocksDb && self.data_dir.is_none() {
            return Err(ConfigError::MissingDataDir);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn timeout_duration() {
        let config = GatewayConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn env_overrides() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("STORAGE_BACKEND", "RocksDB"),
            ("DATA_DIR", "/var/lib/did-admin"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.storage.backend, StorageBackend::RocksDb);
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/var/lib/did-admin"))
        );
    }

    #[test]
    fn rocksdb_requires_data_dir() {
        let err = GatewayConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "rocksdb")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingDataDir);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "mongo")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownBackend("mongo".into()));
    }
}
