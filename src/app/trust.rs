//! Trust-line establishment.

use tracing::info;

use crate::app::sequencer::AccountQueue;
use crate::domain::{ensure_positive_amount, Amount, Asset, DomainError};
use crate::error::BootstrapError;
use crate::port::Operation;

/// Extend a trust line from the queue's account toward a credit asset.
///
/// Re-trusting an already-trusted asset is an accepted no-op on the ledger,
/// so the call is idempotent. A ledger rejection (e.g. insufficient reserve)
/// is deterministic and is not retried: the same envelope at a stale
/// sequence number fails the same way.
///
/// # Errors
///
/// [`BootstrapError::Precondition`] for the native asset or a non-positive
/// limit, before any network call; the folded gateway failure otherwise.
pub async fn extend_trust(
    queue: &mut AccountQueue,
    asset: &Asset,
    limit: Amount,
) -> Result<(), BootstrapError> {
    if asset.is_native() {
        return Err(DomainError::TrustOfNativeAsset.into());
    }
    ensure_positive_amount(limit)?;

    let account = queue.id().clone();
    queue
        .submit(vec![Operation::ChangeTrust {
            asset: asset.clone(),
            limit,
        }])
        .await
        .map_err(|err| BootstrapError::from_gateway(&account, err))?;

    queue.note_trust_line(asset, limit);
    info!(account = %account, asset = %asset, "trust line extended");
    Ok(())
}
