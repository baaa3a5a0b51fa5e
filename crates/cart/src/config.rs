//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SOUK_CART_STORAGE_DIR` - Directory for the file-backed store (default: `.souk`)
//! - `SOUK_CART_STORAGE_KEY` - Slot key the cart is stored under (default: `cart`)
//! - `SOUK_CART_STORAGE_QUOTA_BYTES` - Maximum size of the stored cart in bytes
//! - `SOUK_CART_STORAGE_DISABLED` - Run without persistence (`true`/`false`, default: false)
//! - `SOUK_CURRENCY` - Checkout currency (default: USD)

use std::path::PathBuf;
use std::sync::Arc;

use souk_core::CurrencyCode;
use thiserror::Error;

use crate::adapter::CartStorage;
use crate::storage::{DisabledStore, FileStore};

const DEFAULT_STORAGE_DIR: &str = ".souk";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart storage and checkout configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory holding the file-backed store
    pub storage_dir: PathBuf,
    /// Slot key the cart is stored under
    pub storage_key: String,
    /// Maximum size of the serialized cart in bytes
    pub quota_bytes: Option<usize>,
    /// Run with persistence turned off
    pub storage_disabled: bool,
    /// Currency used for checkout requests
    pub currency: CurrencyCode,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: CartStorage::DEFAULT_KEY.to_string(),
            quota_bytes: None,
            storage_disabled: false,
            currency: CurrencyCode::default(),
        }
    }
}

impl CartConfig {
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = lookup("SOUK_CART_STORAGE_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from);

        let storage_key = lookup("SOUK_CART_STORAGE_KEY")
            .unwrap_or_else(|| CartStorage::DEFAULT_KEY.to_string());
        validate_key(&storage_key)
            .map_err(|e| ConfigError::InvalidEnvVar("SOUK_CART_STORAGE_KEY".to_string(), e))?;

        let quota_bytes = lookup("SOUK_CART_STORAGE_QUOTA_BYTES")
            .map(|value| parse_quota(&value))
            .transpose()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOUK_CART_STORAGE_QUOTA_BYTES".to_string(), e)
            })?;

        let storage_disabled = lookup("SOUK_CART_STORAGE_DISABLED")
            .map(|value| parse_bool(&value))
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("SOUK_CART_STORAGE_DISABLED".to_string(), e))?
            .unwrap_or(false);

        let currency = lookup("SOUK_CURRENCY")
            .map(|value| value.parse::<CurrencyCode>())
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("SOUK_CURRENCY".to_string(), e.to_string()))?
            .unwrap_or_default();

        Ok(Self {
            storage_dir,
            storage_key,
            quota_bytes,
            storage_disabled,
            currency,
        })
    }

    /// Build the storage adapter this configuration describes.
    #[must_use]
    pub fn storage(&self) -> CartStorage {
        if self.storage_disabled {
            return CartStorage::new(Arc::new(DisabledStore), self.storage_key.clone());
        }
        let mut store = FileStore::new(&self.storage_dir);
        if let Some(quota) = self.quota_bytes {
            store = store.with_quota(quota);
        }
        CartStorage::new(Arc::new(store), self.storage_key.clone())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate a slot key: non-empty, `[A-Za-z0-9_.:-]` only.
///
/// # Errors
///
/// Returns a description of the problem.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key cannot be empty".to_string());
    }
    if let Some(bad) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-')))
    {
        return Err(format!("key contains invalid character {bad:?}"));
    }
    Ok(())
}

fn parse_quota(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("quota must be positive".to_string()),
        Ok(quota) => Ok(quota),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(format!("expected a boolean, got {other:?}")),
    }
}
