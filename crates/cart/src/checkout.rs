//! Checkout request builder.
//!
//! The checkout backend owns the payment session; the cart only hands it a
//! list of `{productId, quantity, unitAmount, currency}` lines, priced from a
//! [`PriceBook`]. Once the backend accepts the order, the caller clears the
//! cart with [`crate::CartContext::complete_checkout`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use souk_core::{CartLineItem, CurrencyCode, Price, ProductId, Quantity};
use thiserror::Error;

/// Reasons a checkout request cannot be built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line has no entry in the price book.
    #[error("No price for product {0}")]
    UnpricedProduct(ProductId),

    /// A price is in another currency than the checkout.
    #[error("Product {product_id} is priced in {found}, checkout is in {expected}")]
    CurrencyMismatch {
        product_id: ProductId,
        expected: CurrencyCode,
        found: CurrencyCode,
    },

    /// Negative, or too large for an `i64` of minor units.
    #[error("Price of product {0} cannot be expressed in minor units")]
    InvalidAmount(ProductId),
}

/// Unit prices by product.
///
/// Deserializes from a JSON object keyed by product id:
/// `{"p1": {"amount": "19.99", "currencyCode": "USD"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceBook {
    prices: HashMap<ProductId, Price>,
}

impl PriceBook {
    /// An empty price book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unit price of `product_id`.
    pub fn insert(&mut self, product_id: ProductId, price: Price) {
        self.prices.insert(product_id, price);
    }

    /// Unit price of `product_id`, if known.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&Price> {
        self.prices.get(product_id)
    }

    /// Number of priced products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(ProductId, Price)> for PriceBook {
    fn from_iter<I: IntoIterator<Item = (ProductId, Price)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

/// One priced line of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Unit price in minor units (e.g. cents).
    pub unit_amount: i64,
    pub currency: CurrencyCode,
}

/// Body sent to the checkout backend to open a payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub currency: CurrencyCode,
    pub line_items: Vec<CheckoutLine>,
}

impl CheckoutRequest {
    /// Price every cart line.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the cart is empty, a product has no
    /// price, a price is in another currency, or an amount is negative or
    /// too large.
    pub fn build(
        items: &[CartLineItem],
        prices: &PriceBook,
        currency: CurrencyCode,
    ) -> Result<Self, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let line_items = items
            .iter()
            .map(|item| {
                let price = prices
                    .get(&item.product_id)
                    .ok_or_else(|| CheckoutError::UnpricedProduct(item.product_id.clone()))?;
                if price.currency_code != currency {
                    return Err(CheckoutError::CurrencyMismatch {
                        product_id: item.product_id.clone(),
                        expected: currency,
                        found: price.currency_code,
                    });
                }
                let unit_amount = price
                    .minor_units()
                    .ok_or_else(|| CheckoutError::InvalidAmount(item.product_id.clone()))?;
                Ok(CheckoutLine {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    unit_amount,
                    currency,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            currency,
            line_items,
        })
    }

    /// Sum of `unit_amount * quantity` in minor units, or `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<i64> {
        self.line_items.iter().try_fold(0_i64, |acc, line| {
            line.unit_amount
                .checked_mul(i64::from(line.quantity.get()))
                .and_then(|amount| acc.checked_add(amount))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn line(s: &str, n: u32) -> CartLineItem {
        CartLineItem::new(id(s), Quantity::new(n).unwrap())
    }

    fn usd(amount: &str) -> Price {
        Price::new(Decimal::from_str(amount).unwrap(), CurrencyCode::USD)
    }

    fn book() -> PriceBook {
        [(id("p1"), usd("19.99")), (id("p2"), usd("5"))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_build() {
        let request =
            CheckoutRequest::build(&[line("p1", 2), line("p2", 1)], &book(), CurrencyCode::USD)
                .unwrap();
        assert_eq!(request.line_items.len(), 2);
        assert_eq!(request.line_items.first().unwrap().unit_amount, 1999);
        assert_eq!(request.subtotal(), Some(4498));
    }

    #[test]
    fn test_serialized_shape() {
        let request =
            CheckoutRequest::build(&[line("p2", 3)], &book(), CurrencyCode::USD).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "currency": "USD",
                "lineItems": [
                    {"productId": "p2", "quantity": 3, "unitAmount": 500, "currency": "USD"}
                ]
            })
        );
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(
            CheckoutRequest::build(&[], &book(), CurrencyCode::USD),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_unpriced_product() {
        assert_eq!(
            CheckoutRequest::build(&[line("missing", 1)], &book(), CurrencyCode::USD),
            Err(CheckoutError::UnpricedProduct(id("missing")))
        );
    }

    #[test]
    fn test_currency_mismatch() {
        let err = CheckoutRequest::build(&[line("p1", 1)], &book(), CurrencyCode::AED).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::CurrencyMismatch {
                expected: CurrencyCode::AED,
                found: CurrencyCode::USD,
                ..
            }
        ));
    }

    #[test]
    fn test_negative_price() {
        let mut prices = book();
        prices.insert(id("refund"), usd("-1"));
        assert_eq!(
            CheckoutRequest::build(&[line("refund", 1)], &prices, CurrencyCode::USD),
            Err(CheckoutError::InvalidAmount(id("refund")))
        );
    }

    #[test]
    fn test_price_book_from_json() {
        let prices: PriceBook = serde_json::from_str(
            r#"{"p1": {"amount": "2.50", "currencyCode": "SAR"}}"#,
        )
        .unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get(&id("p1")).unwrap().minor_units(), Some(250));
    }
}
