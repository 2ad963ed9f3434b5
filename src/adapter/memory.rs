//! In-process simulated ledger.
//!
//! A complete ledger model held in memory: per-account sequence enforcement,
//! trust lines, balances, and resting offers, with book queries derived from
//! the offers. This is the paper-mode gateway the binary runs against by
//! default, and the substrate the test kit scripts failures on top of. No
//! matching engine: offers rest until cancelled.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::{
    AccountId, AccountSnapshot, Amount, Asset, Balance, BookLevel, Offer, OfferId,
    OrderBookSnapshot, PriceRatio, Side,
};
use crate::port::{
    GatewayError, LedgerGateway, Operation, SignedEnvelope, Transaction, TransactionSealer,
    TxOutcome,
};

/// Seals transactions into unsigned JSON envelopes.
///
/// Real signing is an external collaborator; paper mode does not verify
/// signatures, so the envelope is just the transaction's wire encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainSealer;

impl TransactionSealer for PlainSealer {
    fn seal(&self, transaction: &Transaction) -> Result<SignedEnvelope, GatewayError> {
        let encoded = serde_json::to_string(transaction).map_err(|err| GatewayError::Rejected {
            code: format!("tx_malformed: {err}"),
        })?;
        Ok(SignedEnvelope {
            transaction: transaction.clone(),
            encoded,
        })
    }
}

#[derive(Debug, Clone, Default)]
struct AccountRecord {
    sequence: i64,
    balances: Vec<Balance>,
    offers: Vec<Offer>,
}

impl AccountRecord {
    fn balance_mut(&mut self, asset: &Asset) -> Option<&mut Balance> {
        self.balances.iter_mut().find(|b| &b.asset == asset)
    }

    fn balance_of(&self, asset: &Asset) -> Amount {
        self.balances
            .iter()
            .find(|b| &b.asset == asset)
            .map(|b| b.amount)
            .unwrap_or_default()
    }

    fn trusts(&self, asset: &Asset) -> bool {
        asset.is_native() || self.balances.iter().any(|b| &b.asset == asset)
    }
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    accounts: HashMap<AccountId, AccountRecord>,
    next_offer_id: u64,
}

/// Simulated ledger gateway.
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// An empty ledger with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                accounts: HashMap::new(),
                next_offer_id: 1,
            }),
        }
    }

    /// Create an account holding a native balance.
    pub fn seed_account(&self, id: impl Into<AccountId>, native: Amount) {
        let mut state = self.state.lock();
        state.accounts.insert(
            id.into(),
            AccountRecord {
                sequence: 0,
                balances: vec![Balance {
                    asset: Asset::Native,
                    amount: native,
                    limit: None,
                }],
                offers: Vec::new(),
            },
        );
    }

    /// Place a resting offer directly, bypassing submission.
    ///
    /// For seeding pre-existing book state; the owner gains a trust line for
    /// any credit leg it lacks.
    pub fn seed_offer(
        &self,
        owner: impl Into<AccountId>,
        selling: Asset,
        buying: Asset,
        price: PriceRatio,
        amount: Amount,
    ) -> OfferId {
        let owner = owner.into();
        let mut state = self.state.lock();
        let id = OfferId::new(state.next_offer_id);
        state.next_offer_id += 1;
        let record = state.accounts.entry(owner.clone()).or_default();
        for asset in [&selling, &buying] {
            if !record.trusts(asset) {
                record.balances.push(Balance {
                    asset: asset.clone(),
                    amount: Decimal::ZERO,
                    limit: None,
                });
            }
        }
        record.offers.push(Offer {
            owner,
            id,
            selling,
            buying,
            price,
            amount,
        });
        id
    }

    /// The current sequence number of an account, for assertions.
    #[must_use]
    pub fn sequence_of(&self, id: &AccountId) -> Option<i64> {
        self.state.lock().accounts.get(id).map(|r| r.sequence)
    }

    fn apply(
        state: &mut LedgerState,
        transaction: &Transaction,
    ) -> Result<TxOutcome, GatewayError> {
        let source = &transaction.source;
        let record = state
            .accounts
            .get(source)
            .ok_or_else(|| GatewayError::Rejected {
                code: "tx_no_source_account".into(),
            })?;
        if transaction.sequence != record.sequence + 1 {
            return Err(GatewayError::Rejected {
                code: "tx_bad_seq".into(),
            });
        }

        let mut created_offers = Vec::new();
        for operation in &transaction.operations {
            Self::apply_operation(state, source, operation, &mut created_offers)?;
        }

        let record = state
            .accounts
            .get_mut(source)
            .expect("source checked above");
        record.sequence = transaction.sequence;
        Ok(TxOutcome {
            result_code: "tx_success".into(),
            created_offers,
        })
    }

    fn apply_operation(
        state: &mut LedgerState,
        source: &AccountId,
        operation: &Operation,
        created_offers: &mut Vec<OfferId>,
    ) -> Result<(), GatewayError> {
        match operation {
            Operation::ChangeTrust { asset, limit } => {
                if asset.is_native() {
                    return Err(GatewayError::Rejected {
                        code: "op_malformed".into(),
                    });
                }
                let record = state.accounts.get_mut(source).expect("source exists");
                match record.balance_mut(asset) {
                    // Re-trusting is a no-op update of the limit.
                    Some(balance) => balance.limit = Some(*limit),
                    None => record.balances.push(Balance {
                        asset: asset.clone(),
                        amount: Decimal::ZERO,
                        limit: Some(*limit),
                    }),
                }
                Ok(())
            }
            Operation::Payment {
                destination,
                asset,
                amount,
            } => {
                if !state.accounts.contains_key(destination) {
                    return Err(GatewayError::Rejected {
                        code: "op_no_destination".into(),
                    });
                }
                // An asset's issuer mints on payment; everyone else needs
                // the balance.
                let minting = asset.issuer() == Some(source);
                if !minting {
                    let record = state.accounts.get_mut(source).expect("source exists");
                    if record.balance_of(asset) < *amount {
                        return Err(GatewayError::Rejected {
                            code: "op_underfunded".into(),
                        });
                    }
                    record
                        .balance_mut(asset)
                        .expect("balance checked above")
                        .amount -= *amount;
                }
                let destination_record = state
                    .accounts
                    .get_mut(destination)
                    .expect("destination checked above");
                if !destination_record.trusts(asset) {
                    return Err(GatewayError::Rejected {
                        code: "op_no_trust".into(),
                    });
                }
                match destination_record.balance_mut(asset) {
                    Some(balance) => balance.amount += *amount,
                    None => destination_record.balances.push(Balance {
                        asset: asset.clone(),
                        amount: *amount,
                        limit: None,
                    }),
                }
                Ok(())
            }
            Operation::ManageOffer {
                offer_id,
                selling,
                buying,
                price,
                amount,
            } => {
                if selling == buying {
                    return Err(GatewayError::Rejected {
                        code: "op_malformed".into(),
                    });
                }
                if amount.is_zero() {
                    let Some(id) = offer_id else {
                        return Err(GatewayError::Rejected {
                            code: "op_malformed".into(),
                        });
                    };
                    let record = state.accounts.get_mut(source).expect("source exists");
                    let before = record.offers.len();
                    record.offers.retain(|offer| offer.id != *id);
                    if record.offers.len() == before {
                        return Err(GatewayError::Rejected {
                            code: "op_offer_not_found".into(),
                        });
                    }
                    return Ok(());
                }

                let record = state.accounts.get(source).expect("source exists");
                for asset in [selling, buying] {
                    if !record.trusts(asset) && asset.issuer() != Some(source) {
                        return Err(GatewayError::Rejected {
                            code: "op_no_trust".into(),
                        });
                    }
                }
                if selling.issuer() != Some(source) && record.balance_of(selling) < *amount {
                    return Err(GatewayError::Rejected {
                        code: "op_underfunded".into(),
                    });
                }

                let id = match offer_id {
                    Some(id) => *id,
                    None => {
                        let id = OfferId::new(state.next_offer_id);
                        state.next_offer_id += 1;
                        id
                    }
                };
                let record = state.accounts.get_mut(source).expect("source exists");
                record.offers.retain(|offer| offer.id != id);
                record.offers.push(Offer {
                    owner: source.clone(),
                    id,
                    selling: selling.clone(),
                    buying: buying.clone(),
                    price: *price,
                    amount: *amount,
                });
                if offer_id.is_none() {
                    created_offers.push(id);
                }
                Ok(())
            }
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn load_account(&self, id: &AccountId) -> Result<AccountSnapshot, GatewayError> {
        let state = self.state.lock();
        let record = state.accounts.get(id).ok_or_else(|| GatewayError::NotFound {
            account: id.clone(),
        })?;
        Ok(AccountSnapshot {
            id: id.clone(),
            sequence: record.sequence,
            balances: record.balances.clone(),
            offers: record.offers.clone(),
        })
    }

    async fn submit(&self, envelope: &SignedEnvelope) -> Result<TxOutcome, GatewayError> {
        let mut state = self.state.lock();
        // Transactions apply atomically: work on a copy, commit on success.
        let mut staged = state.clone();
        let outcome = Self::apply(&mut staged, &envelope.transaction)?;
        *state = staged;
        Ok(outcome)
    }

    async fn order_book(
        &self,
        base: &Asset,
        counter: &Asset,
    ) -> Result<OrderBookSnapshot, GatewayError> {
        let state = self.state.lock();
        let mut bids = Vec::new();
        let mut asks = Vec::new();
        for record in state.accounts.values() {
            for offer in &record.offers {
                match offer.side_for(base, counter) {
                    Some(Side::Buy) => bids.push(BookLevel {
                        owner: offer.owner.clone(),
                        offer_id: offer.id,
                        price: offer.price.invert().to_price(),
                        amount: offer.price.mul_amount(offer.amount),
                    }),
                    Some(Side::Sell) => asks.push(BookLevel {
                        owner: offer.owner.clone(),
                        offer_id: offer.id,
                        price: offer.price.to_price(),
                        amount: offer.amount,
                    }),
                    None => {}
                }
            }
        }
        Ok(OrderBookSnapshot::new(bids, asks))
    }

    async fn offers_for(&self, id: &AccountId) -> Result<Vec<Offer>, GatewayError> {
        let state = self.state.lock();
        let record = state.accounts.get(id).ok_or_else(|| GatewayError::NotFound {
            account: id.clone(),
        })?;
        Ok(record.offers.clone())
    }

    fn gateway_name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn usd(issuer: &str) -> Asset {
        Asset::credit("USD", AccountId::new(issuer))
    }

    fn submit(
        ledger: &InMemoryLedger,
        source: &str,
        sequence: i64,
        operations: Vec<Operation>,
    ) -> Result<TxOutcome, GatewayError> {
        let transaction = Transaction {
            source: AccountId::new(source),
            sequence,
            operations,
        };
        let envelope = PlainSealer.seal(&transaction).unwrap();
        tokio_test::block_on(ledger.submit(&envelope))
    }

    #[test]
    fn sequence_must_be_the_successor() {
        let ledger = InMemoryLedger::new();
        ledger.seed_account("GISSUER", dec!(100));

        let stale = submit(&ledger, "GISSUER", 5, vec![]);
        assert!(matches!(
            stale,
            Err(GatewayError::Rejected { code }) if code == "tx_bad_seq"
        ));

        assert!(submit(&ledger, "GISSUER", 1, vec![]).is_ok());
        assert_eq!(ledger.sequence_of(&AccountId::new("GISSUER")), Some(1));
    }

    #[test]
    fn payment_without_trust_is_rejected_atomically() {
        let ledger = InMemoryLedger::new();
        ledger.seed_account("GISSUER", dec!(100));
        ledger.seed_account("GBUYER", dec!(100));

        let result = submit(
            &ledger,
            "GISSUER",
            1,
            vec![Operation::Payment {
                destination: AccountId::new("GBUYER"),
                asset: usd("GISSUER"),
                amount: dec!(25),
            }],
        );
        assert!(matches!(
            result,
            Err(GatewayError::Rejected { code }) if code == "op_no_trust"
        ));
        // The rejected transaction consumed nothing.
        assert_eq!(ledger.sequence_of(&AccountId::new("GISSUER")), Some(0));
    }

    #[test]
    fn re_trust_is_an_accepted_no_op() {
        let ledger = InMemoryLedger::new();
        ledger.seed_account("GISSUER", dec!(100));
        ledger.seed_account("GBUYER", dec!(100));

        let trust = Operation::ChangeTrust {
            asset: usd("GISSUER"),
            limit: dec!(1000),
        };
        assert!(submit(&ledger, "GBUYER", 1, vec![trust.clone()]).is_ok());
        assert!(submit(&ledger, "GBUYER", 2, vec![trust]).is_ok());
    }

    #[test]
    fn issuer_mints_on_payment() {
        let ledger = InMemoryLedger::new();
        ledger.seed_account("GISSUER", dec!(100));
        ledger.seed_account("GBUYER", dec!(100));

        submit(
            &ledger,
            "GBUYER",
            1,
            vec![Operation::ChangeTrust {
                asset: usd("GISSUER"),
                limit: dec!(1000),
            }],
        )
        .unwrap();
        submit(
            &ledger,
            "GISSUER",
            1,
            vec![Operation::Payment {
                destination: AccountId::new("GBUYER"),
                asset: usd("GISSUER"),
                amount: dec!(25),
            }],
        )
        .unwrap();

        let snapshot = tokio_test::block_on(ledger.load_account(&AccountId::new("GBUYER"))).unwrap();
        assert_eq!(snapshot.balance_of(&usd("GISSUER")), dec!(25));
    }

    #[test]
    fn book_classifies_sides_and_recovers_exact_prices() {
        let ledger = InMemoryLedger::new();
        let base = Asset::Native;
        let counter = usd("GISSUER");

        // Seller asks 0.0025 counter per base for 4000 base.
        ledger.seed_offer(
            "GSELLER",
            base.clone(),
            counter.clone(),
            PriceRatio::from_price(dec!(0.0025)).unwrap(),
            dec!(4000),
        );
        // Buyer bids 0.0023: sells 11.5 counter at the inverse rate.
        ledger.seed_offer(
            "GBUYER",
            counter.clone(),
            base.clone(),
            PriceRatio::from_price(dec!(0.0023)).unwrap().invert(),
            dec!(11.5),
        );

        let book = tokio_test::block_on(ledger.order_book(&base, &counter)).unwrap();
        assert_eq!(book.asks.len(), 1);
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.best_ask().unwrap().price, dec!(0.0025));
        assert_eq!(book.best_bid().unwrap().price, dec!(0.0023));
        assert_eq!(book.best_bid().unwrap().amount, dec!(5000));
    }

    #[test]
    fn cancel_removes_only_the_named_offer() {
        let ledger = InMemoryLedger::new();
        ledger.seed_account("GSELLER", dec!(10000));
        let base = Asset::Native;
        let counter = usd("GISSUER");
        let price = PriceRatio::from_price(dec!(0.0025)).unwrap();
        let first = ledger.seed_offer("GSELLER", base.clone(), counter.clone(), price, dec!(10));
        let second = ledger.seed_offer("GSELLER", base.clone(), counter.clone(), price, dec!(20));

        submit(
            &ledger,
            "GSELLER",
            1,
            vec![Operation::ManageOffer {
                offer_id: Some(first),
                selling: base,
                buying: counter,
                price,
                amount: Decimal::ZERO,
            }],
        )
        .unwrap();

        let offers =
            tokio_test::block_on(ledger.offers_for(&AccountId::new("GSELLER"))).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].id, second);
    }
}
