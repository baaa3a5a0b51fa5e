//! Line quantities.
//!
//! A [`Quantity`] is always at least one. Callers that accept signed input
//! from the view layer decide whether a non-positive value means "remove the
//! line" ([`Quantity::from_signed`]) or "treat as one" ([`Quantity::clamped`]).

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// A positive line quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// The smallest valid quantity.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Convert signed caller input, returning `None` when it is not positive.
    ///
    /// Values above `u32::MAX` saturate.
    #[must_use]
    pub fn from_signed(value: i64) -> Option<Self> {
        if value <= 0 {
            return None;
        }
        Self::new(u32::try_from(value).unwrap_or(u32::MAX))
    }

    /// Convert signed caller input, treating anything below one as one.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        Self::from_signed(value).unwrap_or(Self::ONE)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}

impl From<Quantity> for u64 {
    fn from(q: Quantity) -> Self {
        Self::from(q.get())
    }
}
