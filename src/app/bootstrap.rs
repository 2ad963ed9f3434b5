//! Bootstrap orchestration.
//!
//! Sequences trust, funding, reconciliation, and placement across the
//! issuer/buyer/seller accounts. Each numbered step is a synchronization
//! barrier: branches inside a step run concurrently (they belong to
//! different accounts), the orchestrator waits for all of them, and the
//! failure policy decides whether anything further starts.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::join;
use tracing::{error, info};

use crate::app::funding::fund;
use crate::app::placement::place_offer;
use crate::app::reconcile::clear_offers;
use crate::app::retry::{with_deadline, RetryPolicy};
use crate::app::sequencer::AccountQueue;
use crate::app::trust::extend_trust;
use crate::domain::{AccountId, Amount, Asset, Offer, OrderBookSnapshot, Price, Side};
use crate::error::{BootstrapError, Result};
use crate::port::{GatewayError, LedgerGateway, TransactionSealer};

/// What to do when a branch fails at a barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop scheduling anything after the barrier where a failure occurred.
    AbortOnFailure,
    /// Keep driving the surviving accounts; only the failed account's
    /// remaining transitions are dropped.
    BestEffort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::AbortOnFailure
    }
}

/// How far an account progressed through the bootstrap.
///
/// Transitions fire only on success of the corresponding component call;
/// any failure parks the account in `Failed` and nothing later runs for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unloaded,
    Loaded,
    Trusted,
    Funded,
    Reconciled,
    Offered,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Trusted => "trusted",
            Self::Funded => "funded",
            Self::Reconciled => "reconciled",
            Self::Offered => "offered",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Price and size for one of the two illustrative offers.
#[derive(Debug, Clone)]
pub struct OfferPlan {
    /// Counter units per base unit.
    pub price: Price,
    /// Base units.
    pub amount: Amount,
}

/// Everything a bootstrap run needs to know.
#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    /// The account issuing the credit asset.
    pub issuer: AccountId,
    /// The account placing the buy offer.
    pub buyer: AccountId,
    /// The account placing the sell offer.
    pub seller: AccountId,
    /// Code of the issued asset, e.g. "USD".
    pub asset_code: String,
    /// Trust-line limit extended by buyer and seller.
    pub trust_limit: Amount,
    /// Amount of the issued asset paid to each of buyer and seller.
    pub funding_amount: Amount,
    /// The buyer's offer.
    pub buy: OfferPlan,
    /// The seller's offer.
    pub sell: OfferPlan,
    /// Barrier behavior on failure.
    pub policy: FailurePolicy,
    /// Deadline for each individual gateway call.
    pub deadline: Duration,
    /// Retry policy for account loads.
    pub retry: RetryPolicy,
}

impl BootstrapPlan {
    /// The counter asset of the book: the issued credit asset.
    #[must_use]
    pub fn counter_asset(&self) -> Asset {
        Asset::credit(self.asset_code.clone(), self.issuer.clone())
    }

    /// The base asset of the book: the network's native asset.
    #[must_use]
    pub const fn base_asset(&self) -> Asset {
        Asset::Native
    }
}

/// Final state of one bootstrapped account.
#[derive(Debug, Clone)]
pub struct AccountOutcome {
    /// The account.
    pub id: AccountId,
    /// The last stage reached.
    pub stage: Stage,
    /// Offers cleared during reconciliation.
    pub cleared: usize,
    /// The offer placed for this account, if placement ran.
    pub offer: Option<Offer>,
    /// The failure that parked the account, if any.
    pub error: Option<BootstrapError>,
}

/// Aggregate result of a bootstrap run.
#[derive(Debug)]
pub struct BootstrapReport {
    /// The issuing account.
    pub issuer: AccountId,
    /// Buyer progress.
    pub buyer: AccountOutcome,
    /// Seller progress.
    pub seller: AccountOutcome,
    /// The final book, when the run got far enough to fetch it.
    pub book: Option<OrderBookSnapshot>,
}

impl BootstrapReport {
    /// Whether every branch completed and the book was fetched.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.buyer.error.is_none() && self.seller.error.is_none() && self.book.is_some()
    }
}

/// One account's path through the run: its queue plus progress bookkeeping.
struct Branch {
    id: AccountId,
    queue: Option<AccountQueue>,
    stage: Stage,
    cleared: usize,
    offer: Option<Offer>,
    error: Option<BootstrapError>,
}

impl Branch {
    fn from_load(id: AccountId, loaded: std::result::Result<AccountQueue, GatewayError>) -> Self {
        let mut branch = Self {
            id: id.clone(),
            queue: None,
            stage: Stage::Unloaded,
            cleared: 0,
            offer: None,
            error: None,
        };
        match loaded {
            Ok(queue) => {
                branch.queue = Some(queue);
                branch.stage = Stage::Loaded;
            }
            Err(err) => branch.fail(BootstrapError::from_gateway(&id, err)),
        }
        branch
    }

    fn live(&self) -> bool {
        self.error.is_none() && self.queue.is_some()
    }

    fn fail(&mut self, err: BootstrapError) {
        error!(account = %self.id, stage = %self.stage, error = %err, "bootstrap branch failed");
        self.stage = Stage::Failed;
        self.error = Some(err);
    }

    async fn trust(&mut self, asset: &Asset, limit: Amount) {
        if !self.live() {
            return;
        }
        let Some(queue) = self.queue.as_mut() else {
            return;
        };
        match extend_trust(queue, asset, limit).await {
            Ok(()) => self.stage = Stage::Trusted,
            Err(err) => self.fail(err),
        }
    }

    async fn reload(&mut self) {
        if !self.live() {
            return;
        }
        let Some(queue) = self.queue.as_mut() else {
            return;
        };
        match queue.reload().await {
            Ok(()) => {
                let balances: Vec<String> = queue
                    .snapshot()
                    .balances
                    .iter()
                    .map(|b| format!("{} {}", b.amount, b.asset))
                    .collect();
                info!(account = %self.id, balances = ?balances, "account reloaded");
            }
            Err(err) => {
                let folded = BootstrapError::from_gateway(&self.id, err);
                self.fail(folded);
            }
        }
    }

    async fn reconcile(&mut self) {
        if !self.live() {
            return;
        }
        let Some(queue) = self.queue.as_mut() else {
            return;
        };
        match clear_offers(queue).await {
            Ok(cleared) => {
                self.cleared = cleared;
                self.stage = Stage::Reconciled;
            }
            Err(err) => self.fail(err),
        }
    }

    async fn place(&mut self, side: Side, base: &Asset, counter: &Asset, plan: &OfferPlan) {
        if !self.live() {
            return;
        }
        let Some(queue) = self.queue.as_mut() else {
            return;
        };
        match place_offer(queue, side, base, counter, plan.price, plan.amount).await {
            Ok(offer) => {
                self.offer = Some(offer);
                self.stage = Stage::Offered;
            }
            Err(err) => self.fail(err),
        }
    }

    fn into_outcome(self) -> AccountOutcome {
        AccountOutcome {
            id: self.id,
            stage: self.stage,
            cleared: self.cleared,
            offer: self.offer,
            error: self.error,
        }
    }
}

/// Drives one full bootstrap run against an injected gateway.
pub struct Bootstrap {
    gateway: Arc<dyn LedgerGateway>,
    sealer: Arc<dyn TransactionSealer>,
    plan: BootstrapPlan,
}

impl Bootstrap {
    /// Create an orchestrator over the given gateway and signing capability.
    pub fn new(
        gateway: Arc<dyn LedgerGateway>,
        sealer: Arc<dyn TransactionSealer>,
        plan: BootstrapPlan,
    ) -> Self {
        Self {
            gateway,
            sealer,
            plan,
        }
    }

    /// Whether anything after the current barrier may start.
    fn halted(&self, buyer: &Branch, seller: &Branch) -> bool {
        match self.plan.policy {
            FailurePolicy::AbortOnFailure => !buyer.live() || !seller.live(),
            FailurePolicy::BestEffort => !buyer.live() && !seller.live(),
        }
    }

    /// Run the bootstrap to completion.
    ///
    /// Per-account failures are recorded in the report and governed by the
    /// failure policy; only run-global failures (the issuer cannot be
    /// loaded, the final book cannot be fetched) surface as `Err`.
    ///
    /// # Errors
    ///
    /// The folded issuer load failure, or the book query failure.
    pub async fn run(&self) -> Result<BootstrapReport> {
        let plan = &self.plan;
        let base = plan.base_asset();
        let counter = plan.counter_asset();

        // (1) Load all three accounts concurrently.
        let (issuer_loaded, buyer_loaded, seller_loaded) = join!(
            self.load_queue(&plan.issuer),
            self.load_queue(&plan.buyer),
            self.load_queue(&plan.seller),
        );
        let mut issuer = issuer_loaded
            .map_err(|err| BootstrapError::from_gateway(&plan.issuer, err))
            .map_err(crate::error::Error::from)?;
        let mut buyer = Branch::from_load(plan.buyer.clone(), buyer_loaded);
        let mut seller = Branch::from_load(plan.seller.clone(), seller_loaded);
        info!(
            issuer = %plan.issuer,
            buyer = %plan.buyer,
            seller = %plan.seller,
            "accounts loaded"
        );

        // (2) Extend trust lines toward the issuer, concurrently.
        if !self.halted(&buyer, &seller) {
            join!(
                buyer.trust(&counter, plan.trust_limit),
                seller.trust(&counter, plan.trust_limit),
            );
            info!(asset = %counter, "trust step complete");
        }

        // (3) Fund the destinations. Both payments share the issuer's
        // sequence number, so they are serialized on the issuer's queue;
        // each is gated only on its own destination's trust step.
        if !self.halted(&buyer, &seller) {
            Self::fund_branch(&mut issuer, &mut buyer, &counter, plan.funding_amount).await;
            Self::fund_branch(&mut issuer, &mut seller, &counter, plan.funding_amount).await;
            info!("funding step complete");
        }

        // (4) Reload buyer and seller: balances changed under them.
        if !self.halted(&buyer, &seller) {
            join!(buyer.reload(), seller.reload());
        }

        // (5) Clear any pre-existing resting offers, concurrently.
        if !self.halted(&buyer, &seller) {
            join!(buyer.reconcile(), seller.reconcile());
            info!(
                buyer_cleared = buyer.cleared,
                seller_cleared = seller.cleared,
                "order book cleared"
            );
        }

        // (6) Place the two illustrative offers, concurrently.
        if !self.halted(&buyer, &seller) {
            join!(
                buyer.place(Side::Buy, &base, &counter, &plan.buy),
                seller.place(Side::Sell, &base, &counter, &plan.sell),
            );
            info!("offers placed");
        }

        // (7) Fetch the resulting book, unless the run aborted early.
        let book = if self.halted(&buyer, &seller)
            && plan.policy == FailurePolicy::AbortOnFailure
        {
            None
        } else {
            let snapshot = with_deadline(plan.deadline, self.gateway.order_book(&base, &counter))
                .await
                .map_err(crate::error::Error::from)?;
            info!(
                bids = snapshot.bids.len(),
                asks = snapshot.asks.len(),
                "order book fetched"
            );
            Some(snapshot)
        };

        Ok(BootstrapReport {
            issuer: plan.issuer.clone(),
            buyer: buyer.into_outcome(),
            seller: seller.into_outcome(),
            book,
        })
    }

    async fn load_queue(
        &self,
        id: &AccountId,
    ) -> std::result::Result<AccountQueue, GatewayError> {
        AccountQueue::load(
            Arc::clone(&self.gateway),
            Arc::clone(&self.sealer),
            id.clone(),
            self.plan.deadline,
            self.plan.retry.clone(),
        )
        .await
    }

    async fn fund_branch(
        issuer: &mut AccountQueue,
        branch: &mut Branch,
        asset: &Asset,
        amount: Amount,
    ) {
        if !branch.live() {
            return;
        }
        let Some(snapshot) = branch.queue.as_ref().map(|queue| queue.snapshot().clone()) else {
            return;
        };
        match fund(issuer, &snapshot, asset, amount).await {
            Ok(()) => branch.stage = Stage::Funded,
            Err(err) => branch.fail(err),
        }
    }
}
