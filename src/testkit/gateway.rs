//! Scripted wrapper around any [`LedgerGateway`].
//!
//! Decorates a real gateway (usually the in-memory ledger) with failure
//! injection and an event log, so tests can script outages, rejections, and
//! unknown-outcome submissions, then assert on the order in which calls
//! reached the ledger.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{AccountId, AccountSnapshot, Asset, Offer, OrderBookSnapshot};
use crate::port::{GatewayError, LedgerGateway, Operation, SignedEnvelope, TxOutcome};

/// Coarse operation kind for event-log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    ChangeTrust,
    Payment,
    ManageOffer,
    CancelOffer,
}

impl From<&Operation> for OpKind {
    fn from(operation: &Operation) -> Self {
        match operation {
            Operation::ChangeTrust { .. } => Self::ChangeTrust,
            Operation::Payment { .. } => Self::Payment,
            Operation::ManageOffer { amount, .. } if amount.is_zero() => Self::CancelOffer,
            Operation::ManageOffer { .. } => Self::ManageOffer,
        }
    }
}

/// One observed gateway call.
///
/// `Submit` entries are recorded on completion, so their order reflects when
/// the ledger answered, not when the call was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Load(AccountId),
    Submit {
        source: AccountId,
        sequence: i64,
        kinds: Vec<OpKind>,
    },
    ListOffers(AccountId),
    Book,
}

/// What to do with the next submission from an account.
#[derive(Debug, Clone)]
pub enum SubmitPlan {
    /// Pass through to the inner gateway.
    Apply,
    /// Fail without reaching the inner gateway.
    Fail(GatewayError),
    /// Apply on the inner gateway, then report the error anyway -
    /// the unknown-outcome case where the ledger accepted the envelope.
    FailAfterApply(GatewayError),
}

#[derive(Default)]
struct Script {
    load_failures: HashMap<AccountId, VecDeque<GatewayError>>,
    submit_plans: HashMap<AccountId, VecDeque<SubmitPlan>>,
    submit_delays: HashMap<AccountId, Duration>,
}

/// Failure-injecting, event-logging gateway decorator.
pub struct ScriptedGateway<G> {
    inner: G,
    script: Mutex<Script>,
    events: Mutex<Vec<GatewayEvent>>,
}

impl<G> ScriptedGateway<G> {
    /// Wrap an inner gateway with an empty script.
    pub fn wrap(inner: G) -> Self {
        Self {
            inner,
            script: Mutex::new(Script::default()),
            events: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped gateway, for direct state inspection.
    pub const fn inner(&self) -> &G {
        &self.inner
    }

    /// Script the next load of `account` to fail with `err`.
    pub fn fail_next_load(&self, account: &AccountId, err: GatewayError) {
        self.script
            .lock()
            .load_failures
            .entry(account.clone())
            .or_default()
            .push_back(err);
    }

    /// Script the next submission from `account`. Unscripted submissions
    /// pass through.
    pub fn plan_submit(&self, account: &AccountId, plan: SubmitPlan) {
        self.script
            .lock()
            .submit_plans
            .entry(account.clone())
            .or_default()
            .push_back(plan);
    }

    /// Delay every submission from `account` before it reaches the ledger.
    pub fn delay_submits(&self, account: &AccountId, delay: Duration) {
        self.script
            .lock()
            .submit_delays
            .insert(account.clone(), delay);
    }

    /// Everything observed so far.
    pub fn events(&self) -> Vec<GatewayEvent> {
        self.events.lock().clone()
    }

    /// Completed submissions from one account, in completion order.
    pub fn submits_for(&self, account: &AccountId) -> Vec<GatewayEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, GatewayEvent::Submit { source, .. } if source == account))
            .cloned()
            .collect()
    }

    /// Loads observed for one account.
    pub fn loads_for(&self, account: &AccountId) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, GatewayEvent::Load(id) if id == account))
            .count()
    }

    fn record(&self, event: GatewayEvent) {
        self.events.lock().push(event);
    }
}

#[async_trait]
impl<G: LedgerGateway> LedgerGateway for ScriptedGateway<G> {
    async fn load_account(&self, id: &AccountId) -> Result<AccountSnapshot, GatewayError> {
        self.record(GatewayEvent::Load(id.clone()));
        let scripted = self
            .script
            .lock()
            .load_failures
            .get_mut(id)
            .and_then(VecDeque::pop_front);
        if let Some(err) = scripted {
            return Err(err);
        }
        self.inner.load_account(id).await
    }

    async fn submit(&self, envelope: &SignedEnvelope) -> Result<TxOutcome, GatewayError> {
        let source = envelope.transaction.source.clone();
        let (plan, delay) = {
            let mut script = self.script.lock();
            let plan = script
                .submit_plans
                .get_mut(&source)
                .and_then(VecDeque::pop_front)
                .unwrap_or(SubmitPlan::Apply);
            (plan, script.submit_delays.get(&source).copied())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = match plan {
            SubmitPlan::Apply => self.inner.submit(envelope).await,
            SubmitPlan::Fail(err) => Err(err),
            SubmitPlan::FailAfterApply(err) => {
                let _ = self.inner.submit(envelope).await;
                Err(err)
            }
        };

        self.record(GatewayEvent::Submit {
            source,
            sequence: envelope.transaction.sequence,
            kinds: envelope
                .transaction
                .operations
                .iter()
                .map(OpKind::from)
                .collect(),
        });
        result
    }

    async fn order_book(
        &self,
        base: &Asset,
        counter: &Asset,
    ) -> Result<OrderBookSnapshot, GatewayError> {
        self.record(GatewayEvent::Book);
        self.inner.order_book(base, counter).await
    }

    async fn offers_for(&self, id: &AccountId) -> Result<Vec<Offer>, GatewayError> {
        self.record(GatewayEvent::ListOffers(id.clone()));
        self.inner.offers_for(id).await
    }

    fn gateway_name(&self) -> &'static str {
        "scripted"
    }
}
