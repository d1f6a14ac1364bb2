//! Application configuration.
//!
//! Loaded from environment variables with defaults suitable for local
//! development. Loading never fails; [`AppConfig::validate`] reports bad
//! values before the store is built.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::store::{AdminStore, MemoryStore};

pub const ENV_STORAGE_BACKEND: &str = "ADMIN_STORAGE_BACKEND";
pub const ENV_SEED_SYSTEM_ROLES: &str = "ADMIN_SEED_SYSTEM_ROLES";
pub const ENV_SEED_ADMIN_EMAIL: &str = "ADMIN_SEED_ADMIN_EMAIL";

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Available storage backends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local tables, lost on restart.
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(StorageBackend::Memory),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![StorageBackend::Memory]
    }
}

/// Admin console configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Raw backend name; checked by [`AppConfig::validate`].
    pub storage_backend: String,

    /// Provision the default catalog and system roles at startup.
    pub seed_system_roles: bool,

    /// Email of a super admin account ensured at startup.
    pub seed_admin_email: Option<String>,
}

impl Default for AppConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Memory.as_str().to_string(),
            seed_system_roles: true,
            seed_admin_email: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ADMIN_STORAGE_BACKEND`: storage backend (default: memory)
    /// - `ADMIN_SEED_SYSTEM_ROLES`: seed catalog and system roles (default: true)
    /// - `ADMIN_SEED_ADMIN_EMAIL`: super admin account to ensure on seed
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        Self {
            storage_backend: lookup(ENV_STORAGE_BACKEND).unwrap_or(default.storage_backend),
            seed_system_roles: lookup(ENV_SEED_SYSTEM_ROLES)
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.seed_system_roles),
            seed_admin_email: lookup(ENV_SEED_ADMIN_EMAIL).filter(|s| !s.trim().is_empty()),
        }
    }

    /// Get the parsed storage backend.
    pub fn backend(&self) -> Result<StorageBackend, ConfigError> {
        StorageBackend::parse(&self.storage_backend).ok_or_else(|| ConfigError::InvalidValue {
            key: ENV_STORAGE_BACKEND.to_string(),
            message: format!(
                "unknown backend '{}' (expected one of: {})",
                self.storage_backend,
                StorageBackend::all()
                    .iter()
                    .map(StorageBackend::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend()?;
        if let Some(email) = &self.seed_admin_email {
            if !email.contains('@') {
                return Err(ConfigError::InvalidValue {
                    key: ENV_SEED_ADMIN_EMAIL.to_string(),
                    message: format!("'{}' is not an email address", email),
                });
            }
        }
        Ok(())
    }
}

/// Build the storage backend selected by `config`.
pub fn build_store(config: &AppConfig) -> Result<Arc<dyn AdminStore>, ConfigError> {
    match config.backend()? {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
