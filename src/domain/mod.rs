//! Ledger-agnostic domain types.

mod account;
mod asset;
mod book;
mod error;
mod money;
mod offer;

pub use account::{AccountId, AccountSnapshot, Balance};
pub use asset::Asset;
pub use book::{BookLevel, OrderBookSnapshot};
pub use error::DomainError;
pub use money::{ensure_positive_amount, ensure_positive_price, Amount, Price, PriceRatio};
pub use offer::{Offer, OfferId, Side};
