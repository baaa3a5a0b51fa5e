//! Cart inspection and mutation commands.

use std::path::Path;

use souk_cart::CartConfig;
use souk_cart::parse::parse_line_items;
use tracing::info;

use super::{CommandError, open_cart, parse_product_id, print_json, read_file};

/// Print the cart.
pub fn show(config: &CartConfig) -> Result<(), CommandError> {
    let cart = open_cart(config);
    print_json(&cart.snapshot())
}

/// Add `quantity` units of a product.
pub fn add(config: &CartConfig, product_id: &str, quantity: i64) -> Result<(), CommandError> {
    let product_id = parse_product_id(product_id)?;
    let mut cart = open_cart(config);
    let snapshot = cart.add_item(product_id.clone(), quantity);
    info!(%product_id, total_quantity = snapshot.total_quantity, "Added to cart");
    print_json(&snapshot)
}

/// Remove a product's line.
pub fn remove(config: &CartConfig, product_id: &str) -> Result<(), CommandError> {
    let product_id = parse_product_id(product_id)?;
    let mut cart = open_cart(config);
    let snapshot = cart.remove_item(&product_id);
    print_json(&snapshot)
}

/// Set a product's quantity.
pub fn update(config: &CartConfig, product_id: &str, quantity: i64) -> Result<(), CommandError> {
    let product_id = parse_product_id(product_id)?;
    let mut cart = open_cart(config);
    let snapshot = cart.update_quantity(product_id, quantity);
    print_json(&snapshot)
}

/// Empty the cart.
pub fn clear(config: &CartConfig) -> Result<(), CommandError> {
    let mut cart = open_cart(config);
    let snapshot = cart.clear();
    info!("Cart cleared");
    print_json(&snapshot)
}

/// Seed an empty cart from a JSON file of line items.
///
/// The file goes through the same lenient parser as the stored slot, so
/// malformed entries are dropped rather than failing the command.
pub fn seed(config: &CartConfig, file: &Path) -> Result<(), CommandError> {
    let text = read_file(file)?;
    let defaults = parse_line_items(&text).map_err(|e| CommandError::InvalidFile {
        path: file.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut cart = open_cart(config);
    let before = cart.snapshot().revision;
    let snapshot = cart.seed_if_empty(&defaults);
    if snapshot.revision == before {
        info!("Cart is not empty or defaults are empty, nothing seeded");
    } else {
        info!(lines = snapshot.items.len(), "Cart seeded");
    }
    print_json(&snapshot)
}
