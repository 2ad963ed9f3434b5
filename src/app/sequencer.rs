//! Per-account submission queue.
//!
//! The ledger enforces strict per-account sequence ordering, so everything
//! that consumes an account's sequence number must be serialized. The queue
//! is that discipline: it holds the only live snapshot of its account, and
//! every mutating call takes `&mut self`, so two operations for the same
//! account cannot be in flight at once. Queues for different accounts are
//! independent values and run concurrently without coordination.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::debug;

use crate::app::retry::{load_with_retry, with_deadline, RetryPolicy};
use crate::domain::{AccountId, AccountSnapshot, Amount, Asset, Balance, Offer};
use crate::port::{GatewayError, LedgerGateway, Operation, Transaction, TransactionSealer, TxOutcome};

/// Serial submission queue for one ledger account.
pub struct AccountQueue {
    gateway: Arc<dyn LedgerGateway>,
    sealer: Arc<dyn TransactionSealer>,
    snapshot: AccountSnapshot,
    deadline: Duration,
    retry: RetryPolicy,
}

impl AccountQueue {
    /// Load the account and take ownership of its snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the load failure after the retry policy is exhausted.
    pub async fn load(
        gateway: Arc<dyn LedgerGateway>,
        sealer: Arc<dyn TransactionSealer>,
        id: AccountId,
        deadline: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, GatewayError> {
        let snapshot = load_with_retry(gateway.as_ref(), &id, deadline, &retry).await?;
        Ok(Self {
            gateway,
            sealer,
            snapshot,
            deadline,
            retry,
        })
    }

    /// The account this queue serializes.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.snapshot.id
    }

    /// The owned snapshot. Balances and offers are stale after any
    /// submission until [`reload`](Self::reload); the sequence number is
    /// kept current by the queue itself.
    #[must_use]
    pub const fn snapshot(&self) -> &AccountSnapshot {
        &self.snapshot
    }

    /// The sequence number of the last transaction known accepted.
    #[must_use]
    pub const fn sequence(&self) -> i64 {
        self.snapshot.sequence
    }

    /// Re-fetch the account state, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Propagates the load failure after the retry policy is exhausted.
    pub async fn reload(&mut self) -> Result<(), GatewayError> {
        let id = self.snapshot.id.clone();
        self.snapshot =
            load_with_retry(self.gateway.as_ref(), &id, self.deadline, &self.retry).await?;
        Ok(())
    }

    /// List the offers currently resting for this account.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures; reads are not retried here.
    pub async fn list_offers(&self) -> Result<Vec<Offer>, GatewayError> {
        with_deadline(self.deadline, self.gateway.offers_for(self.id())).await
    }

    /// Seal and submit one transaction carrying the given operations.
    ///
    /// On success the queue advances its local sequence number. A transient
    /// failure leaves the outcome unknown (the envelope may have been
    /// accepted), so the queue re-loads the account and lets the sequence
    /// number decide instead of resubmitting blindly.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Rejected`] verbatim; transient errors only after the
    /// reload shows the transaction was not applied.
    pub async fn submit(&mut self, operations: Vec<Operation>) -> Result<TxOutcome, GatewayError> {
        let transaction = Transaction {
            source: self.snapshot.id.clone(),
            sequence: self.snapshot.next_sequence(),
            operations,
        };
        let envelope = self.sealer.seal(&transaction)?;

        match with_deadline(self.deadline, self.gateway.submit(&envelope)).await {
            Ok(outcome) => {
                self.snapshot.sequence = transaction.sequence;
                Ok(outcome)
            }
            Err(err) if err.is_transient() => {
                self.recover_unknown_outcome(transaction.sequence, err).await
            }
            Err(err) => Err(err),
        }
    }

    /// Resolve a submission whose outcome is unknown.
    ///
    /// Reloads the account: a sequence number at or past the submitted one
    /// means the ledger accepted the envelope before the failure.
    async fn recover_unknown_outcome(
        &mut self,
        submitted_sequence: i64,
        err: GatewayError,
    ) -> Result<TxOutcome, GatewayError> {
        let id = self.snapshot.id.clone();
        let fresh = load_with_retry(self.gateway.as_ref(), &id, self.deadline, &self.retry).await?;
        let advanced = fresh.sequence >= submitted_sequence;
        self.snapshot = fresh;

        if advanced {
            debug!(
                account = %id,
                sequence = submitted_sequence,
                "submission outcome recovered from sequence number after transient failure"
            );
            Ok(TxOutcome {
                result_code: "accepted_unconfirmed".into(),
                created_offers: Vec::new(),
            })
        } else {
            Err(err)
        }
    }

    /// Record a trust line the queue itself just established.
    ///
    /// Keeps the owned snapshot coherent with the accepted transaction
    /// without a full reload.
    pub(crate) fn note_trust_line(&mut self, asset: &Asset, limit: Amount) {
        if !self.snapshot.trusts(asset) {
            self.snapshot.balances.push(Balance {
                asset: asset.clone(),
                amount: Decimal::ZERO,
                limit: Some(limit),
            });
        }
    }
}
