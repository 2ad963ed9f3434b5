//! Monetary types for price and amount representation.
//!
//! Ledger amounts are fixed-precision; everything that can reach the
//! transaction-construction boundary is a `Decimal` or an exact rational,
//! never binary floating point. Offers carry a [`PriceRatio`] so that
//! inverting a price (a buy of the base is a sell of the counter) loses no
//! precision.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Amount represented as a Decimal for precision.
pub type Amount = Decimal;

/// Validate that a price is strictly positive.
///
/// # Errors
///
/// Returns [`DomainError::NonPositivePrice`] for zero or negative values.
pub fn ensure_positive_price(price: Price) -> Result<Price, DomainError> {
    if price <= Decimal::ZERO {
        return Err(DomainError::NonPositivePrice { price });
    }
    Ok(price)
}

/// Validate that an amount is strictly positive.
///
/// # Errors
///
/// Returns [`DomainError::NonPositiveAmount`] for zero or negative values.
pub fn ensure_positive_amount(amount: Amount) -> Result<Amount, DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::NonPositiveAmount { amount });
    }
    Ok(amount)
}

/// An exact positive rational price, reduced to lowest terms.
///
/// On an offer this is the price of one unit of the selling asset, expressed
/// in the buying asset. Keeping it rational means the inverse of a price is
/// exact, so round-tripping buy-side offers through the book reproduces the
/// submitted decimal price bit-for-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRatio {
    n: u64,
    d: u64,
}

impl PriceRatio {
    /// Build a ratio from a positive decimal price.
    ///
    /// # Errors
    ///
    /// [`DomainError::NonPositivePrice`] for zero/negative input;
    /// [`DomainError::PricePrecision`] when the reduced fraction does not
    /// fit the protocol's 64-bit numerator/denominator.
    pub fn from_price(price: Price) -> Result<Self, DomainError> {
        ensure_positive_price(price)?;
        let price = price.normalize();
        let numer = price.mantissa() as u128;
        let denom = 10u128.pow(price.scale());
        let g = gcd(numer, denom);
        let (numer, denom) = (numer / g, denom / g);
        let n = u64::try_from(numer).map_err(|_| DomainError::PricePrecision { price })?;
        let d = u64::try_from(denom).map_err(|_| DomainError::PricePrecision { price })?;
        Ok(Self { n, d })
    }

    /// Build a ratio from raw numerator and denominator, reducing to lowest
    /// terms.
    ///
    /// # Errors
    ///
    /// [`DomainError::NonPositivePrice`] when either part is zero.
    pub fn from_parts(n: u64, d: u64) -> Result<Self, DomainError> {
        if n == 0 || d == 0 {
            return Err(DomainError::NonPositivePrice {
                price: Decimal::ZERO,
            });
        }
        let g = gcd(u128::from(n), u128::from(d)) as u64;
        Ok(Self { n: n / g, d: d / g })
    }

    /// The inverse ratio. Exact by construction.
    #[must_use]
    pub const fn invert(self) -> Self {
        Self {
            n: self.d,
            d: self.n,
        }
    }

    /// The ratio as a decimal price. May round when the fraction has no
    /// terminating decimal expansion; for display and range checks only.
    #[must_use]
    pub fn to_price(self) -> Price {
        Decimal::from(self.n) / Decimal::from(self.d)
    }

    /// Multiply an amount by this ratio.
    #[must_use]
    pub fn mul_amount(self, amount: Amount) -> Amount {
        amount * Decimal::from(self.n) / Decimal::from(self.d)
    }
}

impl PartialOrd for PriceRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cross-multiplication avoids any rounding.
        let lhs = u128::from(self.n) * u128::from(other.d);
        let rhs = u128::from(other.n) * u128::from(self.d);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for PriceRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.n, self.d)
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
