//! Sequence-number discipline: retries re-fetch, timeouts never resubmit
//! blindly, same-account ordering holds, and accounts never block each other.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;

use bookmaker::adapter::memory::{InMemoryLedger, PlainSealer};
use bookmaker::app::{load_with_retry, place_offer, AccountQueue, Bootstrap, FailurePolicy};
use bookmaker::domain::{Asset, Side};
use bookmaker::port::{GatewayError, LedgerGateway, Operation};
use bookmaker::testkit::domain::{account, fast_retry, plan, seeded_ledger, usd};
use bookmaker::testkit::{GatewayEvent, ScriptedGateway, SubmitPlan};

type Scripted = ScriptedGateway<InMemoryLedger>;

async fn queue_for(gateway: Arc<Scripted>, id: &str) -> AccountQueue {
    AccountQueue::load(
        gateway as Arc<dyn LedgerGateway>,
        Arc::new(PlainSealer),
        account(id),
        Duration::from_secs(1),
        fast_retry(),
    )
    .await
    .expect("account loads")
}

fn trust_op() -> Operation {
    Operation::ChangeTrust {
        asset: usd(),
        limit: dec!(1000),
    }
}

#[tokio::test]
async fn load_retry_refetches_instead_of_reusing_a_cached_snapshot() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    gateway.fail_next_load(
        &account("GBUYER"),
        GatewayError::Network("connection reset".into()),
    );

    let snapshot = load_with_retry(
        gateway.as_ref(),
        &account("GBUYER"),
        Duration::from_secs(1),
        &fast_retry(),
    )
    .await
    .unwrap();

    // Two loads reached the gateway: the failed attempt and the re-fetch.
    assert_eq!(gateway.loads_for(&account("GBUYER")), 2);
    assert_eq!(snapshot.sequence, 0);
}

#[tokio::test]
async fn deterministic_rejection_is_not_retried() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    gateway.fail_next_load(
        &account("GNOBODY"),
        GatewayError::Rejected {
            code: "malformed_id".into(),
        },
    );

    let result = load_with_retry(
        gateway.as_ref(),
        &account("GNOBODY"),
        Duration::from_secs(1),
        &fast_retry(),
    )
    .await;

    assert!(matches!(result, Err(GatewayError::Rejected { .. })));
    assert_eq!(gateway.loads_for(&account("GNOBODY")), 1);
}

#[tokio::test]
async fn timed_out_submission_that_applied_is_recovered_not_resubmitted() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    gateway.plan_submit(
        &account("GBUYER"),
        SubmitPlan::FailAfterApply(GatewayError::Timeout { elapsed_ms: 1000 }),
    );
    let mut queue = queue_for(gateway.clone(), "GBUYER").await;

    let outcome = queue.submit(vec![trust_op()]).await.unwrap();

    assert_eq!(outcome.result_code, "accepted_unconfirmed");
    assert_eq!(queue.sequence(), 1);
    assert_eq!(gateway.inner().sequence_of(&account("GBUYER")), Some(1));
    // Exactly one envelope reached the gateway: no blind resubmission.
    assert_eq!(gateway.submits_for(&account("GBUYER")).len(), 1);
}

#[tokio::test]
async fn timed_out_submission_that_never_applied_surfaces_the_failure() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    gateway.plan_submit(
        &account("GBUYER"),
        SubmitPlan::Fail(GatewayError::Timeout { elapsed_ms: 1000 }),
    );
    let mut queue = queue_for(gateway.clone(), "GBUYER").await;

    let result = queue.submit(vec![trust_op()]).await;

    assert!(matches!(result, Err(GatewayError::Timeout { .. })));
    // The reload told the queue the ledger never advanced.
    assert_eq!(queue.sequence(), 0);
    assert_eq!(gateway.inner().sequence_of(&account("GBUYER")), Some(0));
    assert_eq!(gateway.submits_for(&account("GBUYER")).len(), 1);
}

#[tokio::test]
async fn placement_recovers_the_offer_id_after_an_unknown_outcome() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    gateway.plan_submit(
        &account("GSELLER"),
        SubmitPlan::FailAfterApply(GatewayError::Network("connection reset".into())),
    );
    let mut queue = queue_for(gateway.clone(), "GSELLER").await;

    let offer = place_offer(
        &mut queue,
        Side::Sell,
        &Asset::Native,
        &usd(),
        dec!(0.0025),
        dec!(4000),
    )
    .await
    .unwrap();

    assert_eq!(offer.owner, account("GSELLER"));
    assert_eq!(offer.amount, dec!(4000));
    let resting = gateway
        .inner()
        .offers_for(&account("GSELLER"))
        .await
        .unwrap();
    assert_eq!(resting.len(), 1);
    assert_eq!(resting[0].id, offer.id);
}

#[tokio::test]
async fn same_account_submissions_are_strictly_ordered() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    let bootstrap = Bootstrap::new(
        gateway.clone() as Arc<dyn LedgerGateway>,
        Arc::new(PlainSealer),
        plan(FailurePolicy::AbortOnFailure),
    );

    bootstrap.run().await.unwrap();

    for id in ["GISSUER", "GBUYER", "GSELLER"] {
        let sequences: Vec<i64> = gateway
            .submits_for(&account(id))
            .iter()
            .map(|event| match event {
                GatewayEvent::Submit { sequence, .. } => *sequence,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        for pair in sequences.windows(2) {
            assert_eq!(pair[1], pair[0] + 1, "{id} submitted out of order");
        }
    }
}

#[tokio::test]
async fn a_slow_account_does_not_block_the_other() {
    let gateway = Arc::new(ScriptedGateway::wrap(seeded_ledger()));
    gateway.delay_submits(&account("GSELLER"), Duration::from_millis(100));
    let bootstrap = Bootstrap::new(
        gateway.clone() as Arc<dyn LedgerGateway>,
        Arc::new(PlainSealer),
        plan(FailurePolicy::AbortOnFailure),
    );

    bootstrap.run().await.unwrap();

    // Within each concurrent barrier the buyer's submission completes while
    // the seller's is still sleeping; completion order in the log shows it.
    let events = gateway.events();
    let completion = |id: &str| {
        events
            .iter()
            .position(|event| {
                matches!(event, GatewayEvent::Submit { source, .. } if source == &account(id))
            })
            .expect("account submitted")
    };
    assert!(completion("GBUYER") < completion("GSELLER"));
}
