//! Opaque product identifiers.
//!
//! Product IDs come from the catalog backend and are never interpreted by the
//! cart. The only structural rule is that an ID is a non-empty string.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input string is empty.
    #[error("product id cannot be empty")]
    Empty,
}

/// An opaque product identifier, the unique key of a cart line.
///
/// ## Examples
///
/// ```
/// use souk_core::ProductId;
///
/// assert!(ProductId::parse("sku-001").is_ok());
/// assert!(ProductId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parse a `ProductId` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::Empty`] if the input is empty.
    pub fn parse(s: impl Into<String>) -> Result<Self, ProductIdError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }
        Ok(Self(s))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(ProductId::parse("p1").is_ok());
        assert!(ProductId::parse("gid://shop/Product/42").is_ok());
        assert!(ProductId::parse(" ").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(ProductId::parse(""), Err(ProductIdError::Empty)));
    }

    #[test]
    fn test_display() {
        let id = ProductId::parse("p1").unwrap();
        assert_eq!(format!("{id}"), "p1");
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::parse("p1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p1\"");
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<ProductId>("\"\"").is_err());
    }
}
