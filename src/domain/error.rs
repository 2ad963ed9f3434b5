//! Domain validation errors.
//!
//! Returned by constructors and component entry points that validate their
//! inputs before anything reaches the network.

use thiserror::Error;

use super::asset::Asset;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    /// Prices must be strictly positive.
    #[error("price must be positive, got {price}")]
    NonPositivePrice {
        /// The invalid price that was provided.
        price: rust_decimal::Decimal,
    },

    /// Amounts must be strictly positive.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The invalid amount that was provided.
        amount: rust_decimal::Decimal,
    },

    /// The price cannot be represented at protocol precision.
    #[error("price {price} exceeds protocol-allowed precision")]
    PricePrecision {
        /// The price that failed to reduce to a protocol ratio.
        price: rust_decimal::Decimal,
    },

    /// Trust lines only exist for credit assets.
    #[error("cannot extend trust for the native asset")]
    TrustOfNativeAsset,

    /// Both legs of an offer pair must differ.
    #[error("base and counter asset must differ, got {asset}")]
    DegenerateAssetPair {
        /// The asset that appeared on both legs.
        asset: Asset,
    },
}
