//! Offer reconciliation: idempotence and partial-failure reporting.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use bookmaker::adapter::memory::{InMemoryLedger, PlainSealer};
use bookmaker::app::{clear_offers, AccountQueue};
use bookmaker::domain::Asset;
use bookmaker::error::BootstrapError;
use bookmaker::port::{GatewayError, LedgerGateway};
use bookmaker::testkit::domain::{account, fast_retry, ratio, seeded_ledger, usd};
use bookmaker::testkit::{ScriptedGateway, SubmitPlan};

async fn seller_queue(gateway: Arc<ScriptedGateway<InMemoryLedger>>) -> AccountQueue {
    AccountQueue::load(
        gateway as Arc<dyn LedgerGateway>,
        Arc::new(PlainSealer),
        account("GSELLER"),
        Duration::from_secs(1),
        fast_retry(),
    )
    .await
    .expect("seller loads")
}

fn seed_three_offers(ledger: &InMemoryLedger) {
    for amount in [dec!(100), dec!(200), dec!(300)] {
        ledger.seed_offer("GSELLER", Asset::Native, usd(), ratio("0.0030"), amount);
    }
}

#[tokio::test]
async fn clearing_an_empty_account_is_success() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    let mut queue = seller_queue(gateway).await;

    assert_eq!(clear_offers(&mut queue).await.unwrap(), 0);
}

#[tokio::test]
async fn clearing_twice_clears_nothing_the_second_time() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    seed_three_offers(gateway.inner());
    let mut queue = seller_queue(gateway).await;

    assert_eq!(clear_offers(&mut queue).await.unwrap(), 3);
    assert_eq!(clear_offers(&mut queue).await.unwrap(), 0);
}

#[tokio::test]
async fn partial_failure_reports_progress_and_leaves_the_rest() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    seed_three_offers(gateway.inner());
    // First cancellation goes through; the second is rejected.
    gateway.plan_submit(&account("GSELLER"), SubmitPlan::Apply);
    gateway.plan_submit(
        &account("GSELLER"),
        SubmitPlan::Fail(GatewayError::Rejected {
            code: "op_malformed".into(),
        }),
    );
    let mut queue = seller_queue(gateway.clone()).await;

    let err = clear_offers(&mut queue).await.unwrap_err();
    match err {
        BootstrapError::Partial {
            account: who,
            cleared,
            failed_at,
            source,
        } => {
            assert_eq!(who, account("GSELLER"));
            assert_eq!(cleared, 1);
            assert_eq!(failed_at, 2);
            assert!(matches!(*source, BootstrapError::Rejected { .. }));
        }
        other => panic!("expected a partial failure, got {other}"),
    }

    // Offer 1 stays cancelled, offers 2 and 3 stay resting.
    let remaining = gateway
        .inner()
        .offers_for(&account("GSELLER"))
        .await
        .unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0].amount, dec!(200));
    assert_eq!(remaining[1].amount, dec!(300));
}
