//! Checkout request command.

use std::path::Path;

use souk_cart::{CartConfig, CheckoutRequest, PriceBook};
use tracing::info;

use super::{CommandError, open_cart, print_json, read_file};

/// Build and print a checkout request for the cart.
///
/// Sending the request is the checkout backend's job; unless `dry_run` is
/// set, the cart is cleared afterwards as the backend would on success.
pub fn run(config: &CartConfig, prices: &Path, dry_run: bool) -> Result<(), CommandError> {
    let text = read_file(prices)?;
    let price_book: PriceBook =
        serde_json::from_str(&text).map_err(|e| CommandError::InvalidFile {
            path: prices.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut cart = open_cart(config);
    let request = CheckoutRequest::build(cart.items(), &price_book, config.currency)?;
    info!(
        lines = request.line_items.len(),
        subtotal = request.subtotal(),
        currency = %request.currency,
        "Checkout request built"
    );
    print_json(&request)?;

    if !dry_run {
        cart.complete_checkout();
    }
    Ok(())
}
