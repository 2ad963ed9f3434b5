//! Horizon-style REST gateway adapter.

pub mod client;
pub mod dto;

pub use client::HorizonGateway;
