//! Bookmaker - ledger order-book bootstrap and seeding.
//!
//! This crate coordinates a small set of ledger accounts (an issuer, a
//! buyer, a seller) through a dependent sequence against a distributed
//! ledger: extending trust lines for an issued asset, funding the holders,
//! clearing their pre-existing resting orders, and placing a fresh buy/sell
//! pair into the shared order book.
//!
//! The interesting part is the orchestration, not any single ledger call:
//! operations are issued in dependency order, parallelized across accounts,
//! strictly serialized within an account (the ledger enforces per-account
//! sequence numbers), bounded by deadlines, and never blindly resubmitted
//! when an outcome is unknown.
//!
//! # Modules
//!
//! - [`domain`] - Ledger-agnostic types: accounts, assets, offers, books
//! - [`port`] - The [`LedgerGateway`](port::LedgerGateway) capability and
//!   the signing boundary
//! - [`app`] - Bootstrap components and the orchestrator
//! - [`adapter`] - Gateway implementations: in-memory simulated ledger and
//!   a Horizon-style REST client
//! - [`config`] - TOML configuration and logging setup
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bookmaker::adapter::memory::{InMemoryLedger, PlainSealer};
//! use bookmaker::app::Bootstrap;
//! use bookmaker::config::Config;
//!
//! # async fn demo() -> bookmaker::error::Result<()> {
//! let config = Config::load("bookmaker.toml")?;
//! let ledger = Arc::new(InMemoryLedger::new());
//! let report = Bootstrap::new(ledger, Arc::new(PlainSealer), config.plan(true))
//!     .run()
//!     .await?;
//! assert!(report.succeeded());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
