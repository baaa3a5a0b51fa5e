//! Persistent store adapter.
//!
//! [`CartStorage`] binds a [`KeyValueStore`] to one named slot and moves the
//! cart in and out of it as a JSON array of `{productId, quantity}` objects.
//!
//! Two flavours of every operation are offered:
//!
//! - `try_read` / `try_write` / `try_clear` return the [`StorageError`] so the
//!   caller can retry or warn the user.
//! - `read` / `write` / `clear` fail soft: they log a warning and fall back
//!   to an empty cart or a no-op, and never return an error.
//!
//! A `CartStorage` without a backend (see [`CartStorage::detached`]) models
//! an environment with no durable storage: every operation is a no-op.

use std::sync::Arc;

use souk_core::CartLineItem;

use crate::parse::parse_line_items;
use crate::storage::{KeyValueStore, StorageError};

/// Handle to the durable cart slot.
#[derive(Debug, Clone)]
pub struct CartStorage {
    backend: Option<Arc<dyn KeyValueStore>>,
    key: String,
}

impl CartStorage {
    /// Default slot key.
    pub const DEFAULT_KEY: &'static str = "cart";

    /// Create an adapter for `key` in `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            key: key.into(),
        }
    }

    /// Create an adapter with no backend at all.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            backend: None,
            key: Self::DEFAULT_KEY.to_string(),
        }
    }

    /// The slot key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a usable backend is attached.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend().is_ok()
    }

    fn backend(&self) -> Result<&dyn KeyValueStore, StorageError> {
        match &self.backend {
            Some(backend) if backend.is_available() => Ok(backend.as_ref()),
            _ => Err(StorageError::Unavailable),
        }
    }

    /// Read the cart from the slot.
    ///
    /// An absent slot reads as an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] without a usable backend,
    /// [`StorageError::Corrupt`] if the slot does not hold a JSON array, or
    /// the backend's own error.
    pub fn try_read(&self) -> Result<Vec<CartLineItem>, StorageError> {
        match self.backend()?.get(&self.key)? {
            Some(text) => parse_line_items(&text),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the slot with `items`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] without a usable backend, or the
    /// backend's error (e.g. [`StorageError::QuotaExceeded`]).
    pub fn try_write(&self, items: &[CartLineItem]) -> Result<(), StorageError> {
        let backend = self.backend()?;
        let text = serde_json::to_string(items)?;
        backend.set(&self.key, &text)
    }

    /// Remove the slot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] without a usable backend, or the
    /// backend's error.
    pub fn try_clear(&self) -> Result<(), StorageError> {
        self.backend()?.remove(&self.key)
    }

    /// Read the cart, falling back to an empty cart on any failure.
    #[must_use]
    pub fn read(&self) -> Vec<CartLineItem> {
        self.try_read().unwrap_or_else(|e| {
            log_failure("read", &self.key, &e);
            Vec::new()
        })
    }

    /// Write the cart, logging and ignoring any failure.
    pub fn write(&self, items: &[CartLineItem]) {
        if let Err(e) = self.try_write(items) {
            log_failure("write", &self.key, &e);
        }
    }

    /// Remove the slot, logging and ignoring any failure.
    pub fn clear(&self) {
        if let Err(e) = self.try_clear() {
            log_failure("clear", &self.key, &e);
        }
    }
}

/// Log a swallowed storage failure.
///
/// A missing backend is an expected state, not a fault, so it only logs at
/// debug level.
pub(crate) fn log_failure(operation: &str, key: &str, error: &StorageError) {
    match error {
        StorageError::Unavailable => {
            tracing::debug!(operation, key, "Cart storage unavailable");
        }
        _ => {
            tracing::warn!(operation, key, error = %error, "Cart storage operation failed");
        }
    }
}
