//! In-memory cart state.
//!
//! [`CartState`] is the canonical representation the engine mutates. Every
//! mutator keeps the two cart invariants: at most one line per product, and
//! every quantity at least one (enforced by [`Quantity`] itself).

use serde::Serialize;
use souk_core::{CartLineItem, ProductId, Quantity};

/// An ordered list of cart lines, unique by product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CartState {
    lines: Vec<CartLineItem>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines that may repeat a product.
    ///
    /// Repeated products are merged into the first occurrence by summing
    /// quantities; insertion order of first occurrences is kept.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut state = Self::new();
        for line in lines {
            state.add(line.product_id, line.quantity);
        }
        state
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Consume the state and return its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLineItem> {
        self.lines
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for `product_id`, if any.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Increment the line for `product_id`, appending it if absent.
    pub fn add(&mut self, product_id: ProductId, quantity: Quantity) {
        match self.position(&product_id) {
            Some(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.quantity = line.quantity.saturating_add(quantity);
                }
            }
            None => self.lines.push(CartLineItem::new(product_id, quantity)),
        }
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        self.lines.len() != before
    }

    /// Set the quantity for `product_id`, appending the line if absent.
    ///
    /// `None` removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: Option<Quantity>) {
        let Some(quantity) = quantity else {
            self.remove(&product_id);
            return;
        };

        match self.position(&product_id) {
            Some(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.quantity = quantity;
                }
            }
            None => self.lines.push(CartLineItem::new(product_id, quantity)),
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| &line.product_id == product_id)
    }
}

impl From<CartState> for Vec<CartLineItem> {
    fn from(state: CartState) -> Self {
        state.lines
    }
}
