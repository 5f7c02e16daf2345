//! Fixed-point money value object.
//!
//! Amounts are held as a whole number of ten-thousandths, so that half of
//! a half-rate session fee (34.375) stays exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Percentage, ValidationError};

/// Number of minor units per whole currency unit.
const SCALE: i64 = 10_000;

/// Number of fractional digits carried by `Money`.
const FRACTION_DIGITS: usize = 4;

/// Non-negative amount with four fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    /// Creates an amount from ten-thousandths, rejecting negatives.
    pub fn from_minor(minor: i64) -> Result<Self, ValidationError> {
        if minor < 0 {
            return Err(ValidationError::out_of_range("amount", 0, i64::MAX, minor));
        }
        Ok(Self(minor))
    }

    /// Creates an amount from whole cents.
    pub const fn from_cents(cents: u32) -> Self {
        Self(cents as i64 * 100)
    }

    /// Amount in ten-thousandths.
    pub fn as_minor(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The given share of this amount, rounded down to the smallest unit.
    pub fn percent_of(&self, pct: Percentage) -> Money {
        // i128 keeps the intermediate product from overflowing near i64::MAX.
        let minor = (i128::from(self.0) * i128::from(pct.value())) / 100;
        Money(minor as i64)
    }

    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtraction that refuses to go below zero.
    pub fn checked_sub(&self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).filter(|v| *v >= 0).map(Money)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    /// Parses a decimal string such as `137.50` or `68.75`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ValidationError::invalid_format("amount", reason);

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a non-negative decimal number"));
        }
        if frac.len() > FRACTION_DIGITS || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most four fractional digits are supported"));
        }

        let whole: i64 = whole.parse().map_err(|_| invalid("amount too large"))?;
        let frac_minor: i64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = FRACTION_DIGITS);
            padded.parse().map_err(|_| invalid("invalid fraction"))?
        };

        whole
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(frac_minor))
            .map(Money)
            .ok_or_else(|| invalid("amount too large"))
    }
}

impl fmt::Display for Money {
    /// Renders with at least two fractional digits, trimming trailing zeros
    /// beyond that (`137.50`, `34.375`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = format!("{:04}", self.0 % SCALE);
        let trimmed = frac.trim_end_matches('0');
        let shown = if trimmed.len() < 2 { &frac[..2] } else { trimmed };
        write!(f, "{}.{}", whole, shown)
    }
}

impl TryFrom<String> for Money {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(m: Money) -> Self {
        m.to_string()
    }
}
