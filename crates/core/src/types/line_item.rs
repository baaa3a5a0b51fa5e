//! Cart line items.

use serde::{Deserialize, Serialize};

use super::{ProductId, Quantity};

/// One `(productId, quantity)` pair in the cart.
///
/// Serializes to the persisted slot shape:
///
/// ```
/// use souk_core::{CartLineItem, ProductId, Quantity};
///
/// let line = CartLineItem::new(ProductId::parse("p1").unwrap(), Quantity::ONE);
/// let json = serde_json::to_string(&line).unwrap();
/// assert_eq!(json, r#"{"productId":"p1","quantity":1}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Unique key of the line.
    pub product_id: ProductId,
    /// Number of units, always at least one.
    pub quantity: Quantity,
}

impl CartLineItem {
    /// Create a new line item.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let line: CartLineItem =
            serde_json::from_str(r#"{"productId":"p9","quantity":4}"#).unwrap();
        assert_eq!(line.product_id.as_str(), "p9");
        assert_eq!(line.quantity.get(), 4);
    }

    #[test]
    fn test_deserialize_strict_quantity() {
        // Lenient coercion happens in the storage adapter, not here
        assert!(serde_json::from_str::<CartLineItem>(r#"{"productId":"p9","quantity":0}"#).is_err());
    }
}
