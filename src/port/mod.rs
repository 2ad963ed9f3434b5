//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the extension points adapters implement to integrate with
//! external systems. For this crate there is exactly one external system,
//! the ledger network, reached through [`gateway::LedgerGateway`], plus the
//! signing boundary [`gateway::TransactionSealer`].

pub mod gateway;

pub use gateway::{
    GatewayError, LedgerGateway, Operation, SignedEnvelope, Transaction, TransactionSealer,
    TxOutcome,
};
