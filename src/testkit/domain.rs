//! Builders for domain primitives and canonical test fixtures.
//!
//! Provides concise factory functions for accounts, assets, plans, and a
//! pre-seeded ledger so tests focus on assertions rather than construction
//! boilerplate. The canonical fixture mirrors the illustrative bootstrap:
//! an issuer defining USD, a buyer bidding 5000 base at 0.0023, and a
//! seller asking 4000 base at 0.0025.

use std::time::Duration;

use rust_decimal_macros::dec;

use crate::adapter::memory::InMemoryLedger;
use crate::app::{BootstrapPlan, FailurePolicy, OfferPlan, RetryPolicy};
use crate::domain::{AccountId, Asset, PriceRatio};

/// Create an [`AccountId`] from a string.
pub fn account(id: &str) -> AccountId {
    AccountId::new(id)
}

/// The canonical issued asset: USD from `GISSUER`.
pub fn usd() -> Asset {
    Asset::credit("USD", account("GISSUER"))
}

/// Create a [`PriceRatio`] from a decimal literal string.
pub fn ratio(price: &str) -> PriceRatio {
    PriceRatio::from_price(price.parse().expect("test price parses")).expect("test price is valid")
}

/// A retry policy with near-zero delays so tests stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        attempts: 3,
        initial_delay_ms: 1,
        backoff_multiplier: 2.0,
        max_delay_ms: 5,
    }
}

/// The canonical bootstrap plan over `GISSUER`/`GBUYER`/`GSELLER`.
pub fn plan(policy: FailurePolicy) -> BootstrapPlan {
    BootstrapPlan {
        issuer: account("GISSUER"),
        buyer: account("GBUYER"),
        seller: account("GSELLER"),
        asset_code: "USD".into(),
        trust_limit: dec!(1000000),
        funding_amount: dec!(25),
        buy: OfferPlan {
            price: dec!(0.0023),
            amount: dec!(5000),
        },
        sell: OfferPlan {
            price: dec!(0.0025),
            amount: dec!(4000),
        },
        policy,
        deadline: Duration::from_secs(2),
        retry: fast_retry(),
    }
}

/// An in-memory ledger with the three canonical accounts funded with the
/// native asset. Buyer and seller start with no trust line.
pub fn seeded_ledger() -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    ledger.seed_account("GISSUER", dec!(1000));
    ledger.seed_account("GBUYER", dec!(10000));
    ledger.seed_account("GSELLER", dec!(10000));
    ledger
}
