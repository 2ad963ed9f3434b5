//! Resting offers and order-book sides.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::asset::Asset;
use super::money::{Amount, PriceRatio};

/// Ledger-assigned offer identifier - newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(u64);

impl OfferId {
    /// Create a new `OfferId` from the ledger's numeric identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the book an offer takes for a given base/counter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy the base asset, priced in the counter asset.
    Buy,
    /// Sell the base asset, priced in the counter asset.
    Sell,
}

impl Side {
    /// Derive the selling and buying legs for an offer on this side.
    ///
    /// A buy of the base is submitted as selling the counter and buying the
    /// base; a sell of the base is the reverse.
    #[must_use]
    pub fn legs(self, base: &Asset, counter: &Asset) -> (Asset, Asset) {
        match self {
            Self::Buy => (counter.clone(), base.clone()),
            Self::Sell => (base.clone(), counter.clone()),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// A resting offer as it exists in the order book.
///
/// The price is the exact rate of the selling asset in units of the buying
/// asset; which book side the offer takes is derived from the legs, not
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// The account that owns the offer.
    pub owner: AccountId,
    /// Ledger-assigned identifier.
    pub id: OfferId,
    /// The asset the owner is giving up.
    pub selling: Asset,
    /// The asset the owner is acquiring.
    pub buying: Asset,
    /// Units of the buying asset per unit of the selling asset.
    pub price: PriceRatio,
    /// Remaining amount of the selling asset.
    pub amount: Amount,
}

impl Offer {
    /// Classify this offer relative to a base/counter pair.
    ///
    /// Returns `None` when the offer's legs do not match the pair at all.
    #[must_use]
    pub fn side_for(&self, base: &Asset, counter: &Asset) -> Option<Side> {
        if &self.selling == counter && &self.buying == base {
            Some(Side::Buy)
        } else if &self.selling == base && &self.buying == counter {
            Some(Side::Sell)
        } else {
            None
        }
    }
}
