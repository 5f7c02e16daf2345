//! Whole-number percentage, used for refund shares.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A share between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const HALF: Self = Self(50);
    pub const HUNDRED: Self = Self(100);

    /// Values above 100 are clamped.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// True for a full (100%) share.
    pub fn is_full(&self) -> bool {
        self.0 == 100
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_to_hundred() {
        assert_eq!(Percentage::new(50), Percentage::HALF);
        assert_eq!(Percentage::new(101), Percentage::HUNDRED);
        assert_eq!(Percentage::new(255), Percentage::HUNDRED);
    }

    #[test]
    fn only_hundred_is_full() {
        assert!(Percentage::HUNDRED.is_full());
        assert!(!Percentage::HALF.is_full());
        assert!(!Percentage::ZERO.is_full());
    }

    #[test]
    fn displays_with_percent_sign() {
        assert_eq!(Percentage::HALF.to_string(), "50%");
        assert_eq!(Percentage::default().to_string(), "0%");
    }
}
