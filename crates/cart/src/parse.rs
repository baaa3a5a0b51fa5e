//! Defensive parsing of the persisted cart slot.
//!
//! The slot has no schema version, so whatever is found there is treated as
//! untrusted. A payload that is not a JSON array is rejected as a whole;
//! inside an array each element is guarded on its own and bad elements are
//! dropped without affecting the rest. Text that does not parse as JSON at
//! all, including number literals outside the `f64` range, is rejected as a
//! whole because there are no elements to recover.

use serde_json::Value;
use souk_core::{CartLineItem, ProductId, Quantity};

use crate::state::CartState;
use crate::storage::StorageError;

/// Parse the text of a cart slot into normalized line items.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] if the text is not valid JSON (an
/// out-of-range number such as `1e400` counts) or the top-level value is not
/// an array.
pub fn parse_line_items(text: &str) -> Result<Vec<CartLineItem>, StorageError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    let Value::Array(entries) = value else {
        return Err(StorageError::Corrupt(format!(
            "expected an array, found {}",
            kind_of(&value)
        )));
    };

    let total = entries.len();
    let lines: Vec<CartLineItem> = entries.iter().filter_map(parse_entry).collect();
    if lines.len() != total {
        tracing::debug!(
            dropped = total - lines.len(),
            kept = lines.len(),
            "Dropped malformed cart entries"
        );
    }

    Ok(CartState::from_lines(lines).into_lines())
}

/// Parse one array element, or `None` if it has no usable product id.
#[must_use]
pub fn parse_entry(entry: &Value) -> Option<CartLineItem> {
    let object = entry.as_object()?;
    let product_id = object
        .get("productId")
        .and_then(Value::as_str)
        .and_then(|id| ProductId::parse(id).ok())?;
    let quantity = coerce_quantity(object.get("quantity"));
    Some(CartLineItem::new(product_id, quantity))
}

/// Coerce a stored quantity the way a lenient numeric cast would.
///
/// Numbers are truncated; numeric strings are parsed; anything that is not a
/// finite number of at least one becomes one.
#[must_use]
pub fn coerce_quantity(value: Option<&Value>) -> Quantity {
    let numeric = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(true)) => Some(1.0),
        _ => None,
    };

    numeric.map_or(Quantity::ONE, quantity_from_f64)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantity_from_f64(n: f64) -> Quantity {
    if !n.is_finite() || n < 1.0 {
        return Quantity::ONE;
    }
    let truncated = n.trunc();
    if truncated >= f64::from(u32::MAX) {
        return Quantity::new(u32::MAX).unwrap_or(Quantity::ONE);
    }
    Quantity::new(truncated as u32).unwrap_or(Quantity::ONE)
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
