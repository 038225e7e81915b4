//! Fixed-point currency
//!
//! Amounts are kept as integer minor units (centavos) so that sums and
//! comparisons never drift. Decimal strings coming from exports are converted
//! with `rust_decimal` and must be exact to the cent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use super::error::BoletoError;

/// Amount in integer cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Convert a decimal amount, rejecting sub-cent precision
    pub fn from_decimal(amount: Decimal) -> Result<Self, BoletoError> {
        let scaled = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| BoletoError::invalid_amount(&amount.to_string()))?;
        if scaled.fract() != Decimal::ZERO {
            return Err(BoletoError::invalid_amount(&amount.to_string()));
        }
        scaled
            .trunc()
            .to_i64()
            .map(Cents)
            .ok_or_else(|| BoletoError::invalid_amount(&amount.to_string()))
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn checked_add(self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }
}

impl FromStr for Cents {
    type Err = BoletoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| BoletoError::invalid_amount(s))?;
        Cents::from_decimal(amount)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_decimal())
    }
}
