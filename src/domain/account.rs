//! Account identity and state snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::money::Amount;
use super::offer::Offer;

/// Account identifier (public key) - newtype for type safety.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new `AccountId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the account ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A single balance entry on an account.
///
/// For a credit asset the entry doubles as the trust line: holding a balance
/// entry for an asset (even at zero) means the account trusts its issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// The asset this balance is denominated in.
    pub asset: Asset,
    /// Current balance.
    pub amount: Amount,
    /// Maximum the account is willing to hold; `None` for the native asset.
    pub limit: Option<Amount>,
}

/// Point-in-time view of an account as loaded from the ledger.
///
/// The snapshot is read-mostly: it is stale the moment any transaction from
/// this account is accepted, and must be re-fetched before an operation that
/// needs a fresh sequence number.
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    /// The account's public identifier.
    pub id: AccountId,
    /// Sequence number of the last accepted transaction.
    pub sequence: i64,
    /// Balances, including trust-line entries for credit assets.
    pub balances: Vec<Balance>,
    /// Offers currently resting in the book for this account.
    pub offers: Vec<Offer>,
}

impl AccountSnapshot {
    /// Whether the account holds a trust line for the given asset.
    ///
    /// The native asset is always held; a credit asset is trusted when a
    /// balance entry for it exists.
    #[must_use]
    pub fn trusts(&self, asset: &Asset) -> bool {
        asset.is_native() || self.balances.iter().any(|b| &b.asset == asset)
    }

    /// Balance for the given asset, zero if no entry exists.
    #[must_use]
    pub fn balance_of(&self, asset: &Asset) -> Amount {
        self.balances
            .iter()
            .find(|b| &b.asset == asset)
            .map(|b| b.amount)
            .unwrap_or_default()
    }

    /// The sequence number the next transaction from this account must carry.
    #[must_use]
    pub const fn next_sequence(&self) -> i64 {
        self.sequence + 1
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn snapshot_with_usd() -> AccountSnapshot {
        AccountSnapshot {
            id: AccountId::new("GBUYER"),
            sequence: 7,
            balances: vec![Balance {
                asset: Asset::credit("USD", AccountId::new("GISSUER")),
                amount: dec!(25),
                limit: None,
            }],
            offers: vec![],
        }
    }

    #[test]
    fn trusts_native_implicitly() {
        let snapshot = snapshot_with_usd();
        assert!(snapshot.trusts(&Asset::Native));
    }

    #[test]
    fn trusts_credit_only_with_balance_entry() {
        let snapshot = snapshot_with_usd();
        let usd = Asset::credit("USD", AccountId::new("GISSUER"));
        let eur = Asset::credit("EUR", AccountId::new("GISSUER"));

        assert!(snapshot.trusts(&usd));
        assert!(!snapshot.trusts(&eur));
    }

    #[test]
    fn balance_of_missing_entry_is_zero() {
        let snapshot = snapshot_with_usd();
        let eur = Asset::credit("EUR", AccountId::new("GISSUER"));
        assert_eq!(snapshot.balance_of(&eur), dec!(0));
    }

    #[test]
    fn next_sequence_is_successor() {
        let snapshot = snapshot_with_usd();
        assert_eq!(snapshot.next_sequence(), 8);
    }
}
