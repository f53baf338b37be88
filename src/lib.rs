//! NFT bridge operator toolkit.
//!
//! Resolves ledger service endpoints for a named network, submits signed
//! transaction batches and waits for their confirmation, and drives the
//! operator workflows (greeting, requests, transfers, collection cloning,
//! request monitoring) on top of those two primitives.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod resilience;

pub use config::BridgeConfig;
pub use ledger::{submit_and_confirm, LedgerClients};
pub use network::resolve_endpoints;
