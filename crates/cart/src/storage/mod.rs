//! Durable key-value backends for the cart slot.
//!
//! A [`KeyValueStore`] is the device-scoped string store the cart is
//! persisted into. Every operation returns a [`StorageError`] on failure;
//! deciding whether to swallow it is left to the caller.

use std::fmt;

use thiserror::Error;

mod disabled;
mod file;
mod memory;

pub use disabled::DisabledStore;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends and the cart adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No durable store exists in this execution context, or it is disabled.
    #[error("Storage unavailable")]
    Unavailable,

    /// The write would exceed the backend's byte quota.
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The backend could not read or write its medium.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The slot holds data that is not a JSON array.
    #[error("Corrupt cart data: {0}")]
    Corrupt(String),

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A synchronous, string-valued key-value store.
///
/// Implementations must treat `remove` of a missing key as success.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Whether the store can currently be used at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Get the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    ///
    /// A failed `set` must leave the previous value untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be stored.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
