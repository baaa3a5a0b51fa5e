//! Core types for the Souk cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod quantity;

pub use id::{ProductId, ProductIdError};
pub use line_item::CartLineItem;
pub use price::{CurrencyCode, CurrencyCodeError, Price};
pub use quantity::Quantity;
