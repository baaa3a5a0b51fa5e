//! CLI command implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use souk_cart::{CartConfig, CartContext, CartEngine, CheckoutError};
use souk_core::{ProductId, ProductIdError};
use thiserror::Error;

pub mod cart;
pub mod checkout;

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid contents in {}: {reason}", path.display())]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Invalid product id: {0}")]
    ProductId(#[from] ProductIdError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Open a loaded cart context for `config`.
pub fn open_cart(config: &CartConfig) -> CartContext {
    let storage = config.storage();
    if !storage.is_available() {
        tracing::warn!("Cart storage is unavailable, changes will not be kept");
    }
    let mut cart = CartContext::new(CartEngine::new(storage));
    cart.load();
    cart
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, CommandError> {
    Ok(ProductId::parse(raw)?)
}

pub fn read_file(path: &Path) -> Result<String, CommandError> {
    std::fs::read_to_string(path).map_err(|source| CommandError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json(value: &impl Serialize) -> Result<(), CommandError> {
    let text = serde_json::to_string_pretty(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}
