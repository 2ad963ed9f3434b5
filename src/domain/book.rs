//! Order-book snapshot types.
//!
//! A snapshot is a point-in-time read of the resting bids and asks for one
//! base/counter pair. It is a query result, not an owned entity; it carries
//! no ordering guarantee relative to concurrent writers.

use chrono::{DateTime, Utc};

use super::account::AccountId;
use super::money::{Amount, Price};
use super::offer::OfferId;

/// A single resting order as seen in a book snapshot.
#[derive(Debug, Clone)]
pub struct BookLevel {
    /// The account that owns the resting offer.
    pub owner: AccountId,
    /// The resting offer's identifier.
    pub offer_id: OfferId,
    /// Price in counter units per base unit.
    pub price: Price,
    /// Remaining amount, in base units.
    pub amount: Amount,
}

/// Resting bids and asks for a base/counter pair at a point in time.
#[derive(Debug, Clone)]
pub struct OrderBookSnapshot {
    /// Buy interest for the base asset, best (highest) price first.
    pub bids: Vec<BookLevel>,
    /// Sell interest for the base asset, best (lowest) price first.
    pub asks: Vec<BookLevel>,
    /// When the snapshot was taken.
    pub fetched_at: DateTime<Utc>,
}

impl OrderBookSnapshot {
    /// Create a snapshot timestamped now, sorting each side best-first.
    #[must_use]
    pub fn new(mut bids: Vec<BookLevel>, mut asks: Vec<BookLevel>) -> Self {
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));
        Self {
            bids,
            asks,
            fetched_at: Utc::now(),
        }
    }

    /// Best bid (highest buy price).
    #[must_use]
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    /// Best ask (lowest sell price).
    #[must_use]
    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    /// True when neither side has resting interest.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn level(owner: &str, id: u64, price: Price) -> BookLevel {
        BookLevel {
            owner: AccountId::new(owner),
            offer_id: OfferId::new(id),
            price,
            amount: dec!(100),
        }
    }

    #[test]
    fn sides_are_sorted_best_first() {
        let snapshot = OrderBookSnapshot::new(
            vec![level("a", 1, dec!(0.0020)), level("b", 2, dec!(0.0023))],
            vec![level("c", 3, dec!(0.0030)), level("d", 4, dec!(0.0025))],
        );

        assert_eq!(snapshot.best_bid().unwrap().price, dec!(0.0023));
        assert_eq!(snapshot.best_ask().unwrap().price, dec!(0.0025));
    }

    #[test]
    fn empty_book_has_no_best_levels() {
        let snapshot = OrderBookSnapshot::new(vec![], vec![]);
        assert!(snapshot.is_empty());
        assert!(snapshot.best_bid().is_none());
        assert!(snapshot.best_ask().is_none());
    }
}
