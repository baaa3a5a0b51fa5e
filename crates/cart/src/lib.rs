//! Souk Cart - client-side shopping cart.
//!
//! The cart is built in three layers, leaves first:
//!
//! - [`adapter`] - the persistent store adapter: reads and writes the
//!   serialized cart to a named slot of a [`storage::KeyValueStore`], failing
//!   soft on missing or corrupt data
//! - [`engine`] - the cart engine: enforces the cart invariants (one line per
//!   product, quantities of at least one) and persists after every mutation
//! - [`context`] - the reactive cart context: holds the loaded cart, derives
//!   totals and publishes snapshots to subscribers
//!
//! [`checkout`] turns cart lines into a payment-session request for the
//! checkout backend, and [`config`] loads storage settings from the
//! environment.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use souk_cart::{CartContext, CartEngine, CartStorage, storage::MemoryStore};
//! use souk_core::ProductId;
//!
//! let storage = CartStorage::new(Arc::new(MemoryStore::new()), "cart");
//! let mut cart = CartContext::new(CartEngine::new(storage));
//! cart.load();
//!
//! let p1 = ProductId::parse("p1").unwrap();
//! cart.add_item(p1.clone(), 2);
//! cart.add_item(p1, 3);
//!
//! assert_eq!(cart.items().len(), 1);
//! assert_eq!(cart.total_quantity(), 5);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod adapter;
pub mod checkout;
pub mod config;
pub mod context;
pub mod engine;
pub mod parse;
pub mod state;
pub mod storage;

pub use adapter::CartStorage;
pub use checkout::{CheckoutError, CheckoutLine, CheckoutRequest, PriceBook};
pub use config::{CartConfig, ConfigError};
pub use context::{CartContext, CartEvent, CartSnapshot, ContextPhase};
pub use engine::{CartEngine, SeedOutcome};
pub use state::CartState;
pub use storage::{KeyValueStore, StorageError};
