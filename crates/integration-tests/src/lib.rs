//! Integration tests for the Souk cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p souk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end cart behaviour against a file-backed store
//! - `cart_properties` - Property tests for the cart invariants
//! - `cart_persistence` - Reloads, shared slots and storage failures
//!
//! The helpers below give every test its own temporary store directory.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use souk_cart::storage::{FileStore, KeyValueStore};
use souk_cart::{CartContext, CartEngine, CartStorage};
use souk_core::{CartLineItem, ProductId, Quantity};
use tempfile::TempDir;

/// A temporary directory-backed store that is removed on drop.
pub struct TestStore {
    dir: TempDir,
    store: FileStore,
}

impl TestStore {
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        Self { dir, store }
    }

    /// Adapter for the default `cart` slot.
    #[must_use]
    pub fn storage(&self) -> CartStorage {
        self.storage_for(CartStorage::DEFAULT_KEY)
    }

    /// Adapter for an arbitrary slot.
    #[must_use]
    pub fn storage_for(&self, key: &str) -> CartStorage {
        CartStorage::new(Arc::new(self.store.clone()), key)
    }

    /// A fresh, unloaded context over the default slot.
    #[must_use]
    pub fn context(&self) -> CartContext {
        CartContext::new(CartEngine::new(self.storage()))
    }

    /// Write raw text into the default slot.
    pub fn put_raw(&self, text: &str) {
        self.store.set(CartStorage::DEFAULT_KEY, text).unwrap();
    }

    /// Raw text of the default slot.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.store.get(CartStorage::DEFAULT_KEY).unwrap()
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn id(s: &str) -> ProductId {
    ProductId::parse(s).unwrap()
}

#[must_use]
pub fn line(s: &str, quantity: u32) -> CartLineItem {
    CartLineItem::new(id(s), Quantity::new(quantity).unwrap())
}
