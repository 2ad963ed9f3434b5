//! Issuer-to-destination funding payments.

use tracing::info;

use crate::app::sequencer::AccountQueue;
use crate::domain::{ensure_positive_amount, AccountSnapshot, Amount, Asset};
use crate::error::BootstrapError;
use crate::port::Operation;

/// Pay `amount` of `asset` from the issuer to a destination account.
///
/// The destination must already hold a trust line for the asset; violating
/// that is a caller bug, reported as a precondition failure before any
/// network call. Funding is not idempotent - repeating it double-funds - so
/// the orchestrator issues it exactly once per destination per run.
///
/// # Errors
///
/// [`BootstrapError::Precondition`] for a missing trust line or non-positive
/// amount; the folded gateway failure otherwise.
pub async fn fund(
    issuer: &mut AccountQueue,
    destination: &AccountSnapshot,
    asset: &Asset,
    amount: Amount,
) -> Result<(), BootstrapError> {
    ensure_positive_amount(amount)?;
    if !destination.trusts(asset) {
        return Err(BootstrapError::Precondition(format!(
            "destination {} holds no trust line for {asset}",
            destination.id
        )));
    }

    let issuer_id = issuer.id().clone();
    issuer
        .submit(vec![Operation::Payment {
            destination: destination.id.clone(),
            asset: asset.clone(),
            amount,
        }])
        .await
        .map_err(|err| BootstrapError::from_gateway(&issuer_id, err))?;

    info!(
        issuer = %issuer_id,
        destination = %destination.id,
        asset = %asset,
        amount = %amount,
        "destination funded"
    );
    Ok(())
}
