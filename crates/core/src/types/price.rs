//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Amount in the smallest currency unit (e.g., cents), rounded half-even.
    ///
    /// Returns `None` for negative amounts or on overflow.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return None;
        }
        let scale = Decimal::from(10_i64.pow(self.currency_code.minor_unit_exponent()));
        self.amount.checked_mul(scale)?.round().to_i64()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {}",
            self.amount.round_dp(self.currency_code.minor_unit_exponent()),
            self.currency_code.code()
        )
    }
}

/// Errors that can occur when parsing a [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyCodeError(pub String);

/// ISO 4217 currency codes accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    AED,
    SAR,
    CNY,
}

impl CurrencyCode {
    /// The three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::AED => "AED",
            Self::SAR => "SAR",
            Self::CNY => "CNY",
        }
    }

    /// Number of decimal places in the minor unit.
    #[must_use]
    pub const fn minor_unit_exponent(self) -> u32 {
        // All supported currencies use cents/fils/halalas/fen.
        2
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "AED" => Ok(Self::AED),
            "SAR" => Ok(Self::SAR),
            "CNY" => Ok(Self::CNY),
            _ => Err(CurrencyCodeError(s.to_string())),
        }
    }
}
