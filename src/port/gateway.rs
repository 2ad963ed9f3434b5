//! Ledger gateway port for account state, submission, and book queries.
//!
//! This module defines the traits for interacting with the ledger network.
//! They are the primary integration points for external services: everything
//! the orchestration layer does suspends on exactly these calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    AccountId, AccountSnapshot, Amount, Asset, Offer, OfferId, OrderBookSnapshot, PriceRatio,
};

/// Failures surfaced by a ledger gateway.
///
/// `Rejected` is deterministic: resubmitting the identical transaction at the
/// same sequence number fails the same way, so callers must never retry it
/// verbatim. `Network` and `Timeout` are transport-level and transient; a
/// caller may retry them only after re-loading account state.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// The account has never been funded on the network.
    #[error("account {account} not found on the ledger")]
    NotFound {
        /// The account that was looked up.
        account: AccountId,
    },

    /// Protocol-level rejection (bad sequence, insufficient reserve,
    /// malformed operation).
    #[error("transaction rejected by the ledger: {code}")]
    Rejected {
        /// The ledger's result code.
        code: String,
    },

    /// Transport-level failure; the outcome of an in-flight submission is
    /// unknown.
    #[error("network error: {0}")]
    Network(String),

    /// The call did not complete within its deadline.
    #[error("timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the call was allowed to run.
        elapsed_ms: u64,
    },
}

impl GatewayError {
    /// Whether this failure is transient (transport class) rather than a
    /// deterministic rejection.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout { .. })
    }
}

/// A single ledger operation inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Extend (or re-assert) a trust line from the transaction source
    /// toward a credit asset.
    ChangeTrust {
        /// The credit asset to trust.
        asset: Asset,
        /// Maximum the account is willing to hold.
        limit: Amount,
    },
    /// Pay `amount` of `asset` from the transaction source to `destination`.
    Payment {
        /// The receiving account.
        destination: AccountId,
        /// The asset to transfer.
        asset: Asset,
        /// The amount to transfer.
        amount: Amount,
    },
    /// Create, update, or cancel a resting offer. An amount of zero against
    /// an existing `offer_id` cancels it.
    ManageOffer {
        /// Existing offer to update/cancel, `None` to create.
        offer_id: Option<OfferId>,
        /// The asset being given up.
        selling: Asset,
        /// The asset being acquired.
        buying: Asset,
        /// Units of the buying asset per unit of the selling asset.
        price: PriceRatio,
        /// Amount of the selling asset; zero cancels.
        amount: Amount,
    },
}

/// An unsigned transaction: one source account, one sequence number, and the
/// operations to apply atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// The account paying the fee and providing the sequence number.
    pub source: AccountId,
    /// Must equal the source account's current sequence number plus one.
    pub sequence: i64,
    /// Operations applied in order, all or nothing.
    pub operations: Vec<Operation>,
}

/// An opaque signed transaction envelope, ready for submission.
///
/// Envelope construction and signing are external concerns; this crate only
/// carries the sealed bytes through to [`LedgerGateway::submit`].
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    /// The transaction the envelope was sealed from.
    pub transaction: Transaction,
    /// Wire encoding of the signed envelope.
    pub encoded: String,
}

/// Result of an accepted transaction.
#[derive(Debug, Clone, Default)]
pub struct TxOutcome {
    /// The ledger's result code for the accepted transaction.
    pub result_code: String,
    /// Offer ids created by the transaction's operations, in operation order.
    pub created_offers: Vec<OfferId>,
}

/// Seals an unsigned transaction into a signed envelope.
///
/// This is the signing boundary: key handling and envelope encoding live
/// behind it and are not implemented in this crate.
pub trait TransactionSealer: Send + Sync {
    /// Produce a signed envelope for the given transaction.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Rejected`] when the transaction cannot be
    /// sealed (unknown source account, malformed operation).
    fn seal(&self, transaction: &Transaction) -> Result<SignedEnvelope, GatewayError>;
}

/// Capability handle for the ledger network.
///
/// Injected into every component as `Arc<dyn LedgerGateway>` rather than held
/// as ambient global state, so tests can substitute a scripted double.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Load the current state of an account.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFound`] if the account has never been funded on
    /// the network; transport-class errors otherwise.
    async fn load_account(&self, id: &AccountId) -> Result<AccountSnapshot, GatewayError>;

    /// Submit a signed transaction envelope.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Rejected`] for protocol-level rejections,
    /// transport-class errors for transport failures. The two must stay
    /// distinguishable: only the latter may ever be retried, and only after
    /// re-checking account state.
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<TxOutcome, GatewayError>;

    /// Query the current order book for a base/counter pair.
    ///
    /// A point-in-time read with no ordering guarantee relative to
    /// concurrent writers.
    async fn order_book(
        &self,
        base: &Asset,
        counter: &Asset,
    ) -> Result<OrderBookSnapshot, GatewayError>;

    /// List the offers currently owned by an account.
    async fn offers_for(&self, id: &AccountId) -> Result<Vec<Offer>, GatewayError>;

    /// Gateway name for logging/debugging.
    fn gateway_name(&self) -> &'static str;
}
