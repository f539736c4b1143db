//! Type-safe unit price using decimal arithmetic.
//!
//! The cart never computes totals from prices; it only carries them so the
//! checkout screens can display them. Persisted carts store the price as a
//! plain JSON number, so serialization goes through an `f64` while the
//! in-memory value stays a [`Decimal`].
//!
//! Any decimal with at most [`MAX_SIGNIFICANT_DIGITS`] significant digits
//! survives the trip through the nearest `f64` and back, so [`Price::new`]
//! rejects anything longer. Stored floats with more digits (float noise from
//! older app releases) are rounded to that precision when read.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),

    /// The amount cannot be stored as a JSON number without changing.
    #[error("price has more than 15 significant digits: {0}")]
    TooPrecise(Decimal),
}

/// Significant digits a price may carry.
pub const MAX_SIGNIFICANT_DIGITS: u32 = 15;

/// A non-negative unit price.
///
/// ## Examples
///
/// ```
/// use go_marketplace_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::new(Decimal::new(1999, 2)).is_ok());
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// assert!(Price::new(Decimal::new(123_456_789_012_345_678, 3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero, or
    /// [`PriceError::TooPrecise`] if it has more than
    /// [`MAX_SIGNIFICANT_DIGITS`] significant digits.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if significant_digits(amount) > MAX_SIGNIFICANT_DIGITS {
            return Err(PriceError::TooPrecise(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from an amount in cents (e.g., `1999` is `19.99`).
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

fn significant_digits(amount: Decimal) -> u32 {
    amount
        .normalize()
        .mantissa()
        .unsigned_abs()
        .checked_ilog10()
        .map_or(0, |log| log + 1)
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Parsing the decimal text picks the nearest f64
        let value = self
            .0
            .normalize()
            .to_string()
            .parse::<f64>()
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_f64(value)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        // `f64` displays as the shortest text that parses back to it
        let mut amount = Decimal::from_str(&value.to_string()).map_err(serde::de::Error::custom)?;
        if significant_digits(amount) > MAX_SIGNIFICANT_DIGITS {
            amount = amount
                .round_sf(MAX_SIGNIFICANT_DIGITS)
                .ok_or_else(|| serde::de::Error::custom(format!("price out of range: {value}")))?
                .normalize();
        }
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
