//! Offer reconciliation: clearing an account's resting orders.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::app::sequencer::AccountQueue;
use crate::error::BootstrapError;
use crate::port::Operation;

/// Cancel every offer the account owns, leaving a clean slate.
///
/// Only the account's own offers are touched - the caller has no authority
/// over other participants' resting orders. An empty set is success, not an
/// error. Cancellations are issued one at a time on the account's queue
/// because each consumes the next sequence number; cancellations for other
/// accounts proceed concurrently on their own queues.
///
/// If cancellation `i` of `n` fails, the first `i - 1` remain cancelled
/// (no compensating rollback); the error reports how many succeeded and the
/// first failure, and the orchestrator decides whether the run continues.
///
/// # Errors
///
/// [`BootstrapError::Partial`] carrying the progress count and the folded
/// first failure; a plain folded failure if listing the offers fails.
pub async fn clear_offers(queue: &mut AccountQueue) -> Result<usize, BootstrapError> {
    let account = queue.id().clone();
    let offers = queue
        .list_offers()
        .await
        .map_err(|err| BootstrapError::from_gateway(&account, err))?;

    if offers.is_empty() {
        debug!(account = %account, "no resting offers to clear");
        return Ok(0);
    }

    let total = offers.len();
    for (index, offer) in offers.into_iter().enumerate() {
        let cancel = Operation::ManageOffer {
            offer_id: Some(offer.id),
            selling: offer.selling,
            buying: offer.buying,
            price: offer.price,
            amount: Decimal::ZERO,
        };
        if let Err(err) = queue.submit(vec![cancel]).await {
            return Err(BootstrapError::Partial {
                account: account.clone(),
                cleared: index,
                failed_at: index + 1,
                source: Box::new(BootstrapError::from_gateway(&account, err)),
            });
        }
    }

    info!(account = %account, cleared = total, "resting offers cleared");
    Ok(total)
}
