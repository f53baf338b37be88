//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (mnemonic)
//!     → wallet.rs (key derivation, signing)
//!     → transaction.rs (build, canonical encoding, sign)
//!     → algod.rs (params, broadcast, pending state)
//!     → submit.rs (sign, broadcast, confirm)
//!
//! indexer.rs answers questions about holdings and history.
//! ```
//!
//! # Security Constraints
//! - Mnemonics ONLY from environment variables
//! - Never log keys, mnemonics, or API tokens
//! - All service calls have configurable timeouts

pub mod address;
pub mod algod;
pub mod indexer;
pub mod service;
pub mod submit;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use address::Address;
pub use algod::AlgodClient;
pub use indexer::{AssetHolding, AssetRecord, IndexerClient};
pub use submit::{submit_and_confirm, submit_and_confirm_detailed, DEFAULT_CONFIRMATION_ROUNDS};
pub use transaction::{AssetParams, SignedTransaction, SuggestedParams, Transaction};
pub use types::{Confirmation, LedgerError, LedgerResult, TxId};
pub use wallet::Account;

use crate::config::schema::NetworkConfig;
use crate::config::BridgeConfig;
use crate::network::{resolve_endpoints, Endpoints};

/// Submission and query clients for one network.
#[derive(Debug, Clone)]
pub struct LedgerClients {
    pub endpoints: Endpoints,
    pub algod: AlgodClient,
    pub indexer: IndexerClient,
}

impl LedgerClients {
    /// Resolve `network` and build both clients.
    pub fn connect(network: &NetworkConfig, config: &BridgeConfig) -> LedgerResult<Self> {
        let endpoints = resolve_endpoints(network.network_name(), &network.overrides());
        let algod = AlgodClient::new(&endpoints.algod, config)?;
        let indexer = IndexerClient::new(&endpoints.indexer, config)?;
        tracing::info!(
            network = %endpoints.network,
            algod = %endpoints.algod.server,
            indexer = %endpoints.indexer.server,
            "Ledger clients initialized"
        );
        Ok(Self {
            endpoints,
            algod,
            indexer,
        })
    }
}
