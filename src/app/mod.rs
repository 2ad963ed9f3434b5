//! Application layer - the bootstrap components and their orchestration.

pub mod bootstrap;
pub mod funding;
pub mod placement;
pub mod reconcile;
pub mod retry;
pub mod sequencer;
pub mod trust;

pub use bootstrap::{
    AccountOutcome, Bootstrap, BootstrapPlan, BootstrapReport, FailurePolicy, OfferPlan, Stage,
};
pub use funding::fund;
pub use placement::place_offer;
pub use reconcile::clear_offers;
pub use retry::{load_with_retry, RetryPolicy};
pub use sequencer::AccountQueue;
pub use trust::extend_trust;
