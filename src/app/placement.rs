//! Offer placement.

use tracing::info;

use crate::app::sequencer::AccountQueue;
use crate::domain::{
    ensure_positive_amount, ensure_positive_price, Amount, Asset, DomainError, Offer, Price,
    PriceRatio, Side,
};
use crate::error::BootstrapError;
use crate::port::Operation;

/// Place a new offer for the base/counter pair on the given side.
///
/// `price` is counter units per base unit and `amount` is in base units,
/// regardless of side; the selling/buying legs and the wire-level rate are
/// derived. A buy of the base sells the counter, so its selling amount is
/// `amount * price` and its rate is the exact inverse ratio.
///
/// A rejection (insufficient balance, price outside protocol precision) is
/// deterministic and not retried.
///
/// # Errors
///
/// [`BootstrapError::Precondition`] for non-positive price/amount or a
/// degenerate pair, before any network call; the folded gateway failure
/// otherwise.
pub async fn place_offer(
    queue: &mut AccountQueue,
    side: Side,
    base: &Asset,
    counter: &Asset,
    price: Price,
    amount: Amount,
) -> Result<Offer, BootstrapError> {
    ensure_positive_price(price)?;
    ensure_positive_amount(amount)?;
    if base == counter {
        return Err(DomainError::DegenerateAssetPair {
            asset: base.clone(),
        }
        .into());
    }

    let ratio = PriceRatio::from_price(price)?;
    let (selling, buying) = side.legs(base, counter);
    let (wire_price, selling_amount) = match side {
        Side::Sell => (ratio, amount),
        Side::Buy => (ratio.invert(), amount * price),
    };

    let account = queue.id().clone();
    let outcome = queue
        .submit(vec![Operation::ManageOffer {
            offer_id: None,
            selling: selling.clone(),
            buying: buying.clone(),
            price: wire_price,
            amount: selling_amount,
        }])
        .await
        .map_err(|err| BootstrapError::from_gateway(&account, err))?;

    let offer = match outcome.created_offers.first().copied() {
        Some(id) => Offer {
            owner: account.clone(),
            id,
            selling,
            buying,
            price: wire_price,
            amount: selling_amount,
        },
        // Accepted but unconfirmed (outcome recovered after a transient
        // failure): the id is only known to the ledger, so re-list.
        None => queue
            .list_offers()
            .await
            .map_err(|err| BootstrapError::from_gateway(&account, err))?
            .into_iter()
            .find(|offer| {
                offer.selling == selling && offer.buying == buying && offer.price == wire_price
            })
            .ok_or_else(|| BootstrapError::Network {
                account: account.clone(),
                reason: "offer accepted but missing when re-listing".into(),
            })?,
    };

    info!(
        account = %account,
        side = %side,
        offer_id = %offer.id,
        price = %price,
        amount = %amount,
        "offer placed"
    );
    Ok(offer)
}
