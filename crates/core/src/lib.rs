//! Souk Core - Shared types library.
//!
//! This crate provides common types used across all Souk cart components:
//! - `cart` - Persistent store adapter, cart engine and reactive cart context
//! - `cli` - Command-line driver for inspecting and mutating a persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no logging. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, quantities, line items and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
