//! App configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `HOMESERVICE_DATA_DIR` - Directory for persisted slots (default: ./data)
//! - `HOMESERVICE_STORAGE` - Storage backend, `file` or `memory` (default: file)
//! - `HOMESERVICE_KEY_PREFIX` - Prefix prepended to every slot name (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::storage::{FileStore, KeyValueStore, MemoryStore, SlotKeys};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which key-value backend persists app state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// One JSON file per slot under the data directory.
    #[default]
    File,
    /// In-process only; nothing survives a restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected `file` or `memory`, got `{other}`")),
        }
    }
}

/// App configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding persisted slots (file backend)
    pub data_dir: PathBuf,
    /// Storage backend
    pub storage: StorageBackend,
    /// Prefix prepended to each slot name
    pub key_prefix: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage: StorageBackend::default(),
            key_prefix: String::new(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

const DEFAULT_DATA_DIR: &str = "./data";

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("HOMESERVICE_DATA_DIR", DEFAULT_DATA_DIR));
        let storage = get_env_or_default("HOMESERVICE_STORAGE", "file")
            .parse::<StorageBackend>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOMESERVICE_STORAGE".to_string(), e))?;
        let key_prefix = get_env_or_default("HOMESERVICE_KEY_PREFIX", "");
        validate_key_prefix(&key_prefix)?;

        Ok(Self {
            data_dir,
            storage,
            key_prefix,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Slot names for this configuration.
    #[must_use]
    pub fn slot_keys(&self) -> SlotKeys {
        SlotKeys::with_prefix(&self.key_prefix)
    }

    /// Build the configured key-value store.
    #[must_use]
    pub fn build_store(&self) -> Arc<dyn KeyValueStore> {
        match self.storage {
            StorageBackend::File => Arc::new(FileStore::new(&self.data_dir)),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Prefixes end up in file names, so keep them to a safe character set.
fn validate_key_prefix(prefix: &str) -> Result<(), ConfigError> {
    if !prefix.starts_with('.')
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "HOMESERVICE_KEY_PREFIX".to_string(),
            "only ASCII letters, digits, '_', '-' and '.' are allowed, not starting with '.'"
                .to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("file".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!(" Memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_validate_key_prefix() {
        assert!(validate_key_prefix("").is_ok());
        assert!(validate_key_prefix("demo.v2_").is_ok());
        assert!(validate_key_prefix(".hidden").is_err());
        assert!(matches!(
            validate_key_prefix("../etc"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_slot_keys_use_prefix() {
        let config = AppConfig {
            key_prefix: "demo.".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.slot_keys().bookings, "demo.bookings");
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.storage, StorageBackend::File);
        assert!(config.sentry_dsn.is_none());
    }
}
