//! Operator workflows layered on the ledger clients.
//!
//! # Workflows
//! ```text
//! hello      zero-amount payment to the bridge (+ optional random request)
//! request    fee payment carrying a bridge request note, per asset in a file
//! transfer   asset transfer of each held NFT to the bridge
//! clone      copy a collection from one network to the operator account
//! opt-in     zero-amount asset transfer to self
//! watch      follow incoming bridge requests
//! ```
//!
//! Every workflow prints operator status lines to stdout and leaves
//! diagnostics to `tracing`.

pub mod clone;
pub mod monitor;
pub mod note;
pub mod opt_in;
pub mod request;
pub mod transfer;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::BridgeConfig;
use crate::ledger::{
    submit_and_confirm, submit_and_confirm_detailed, Account, Address, AssetRecord, Confirmation,
    LedgerClients, LedgerError, Transaction, TxId,
};

/// Errors surfaced by the workflows.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Missing or malformed operator input.
    #[error("Input error: {0}")]
    Input(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A creation transaction confirmed without reporting the new asset.
    #[error("Transaction {0} did not report a created asset")]
    MissingCreatedAsset(TxId),
}

/// Result type for workflows.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// What every signing workflow needs: config, clients, and the signer.
#[derive(Debug, Clone, Copy)]
pub struct BridgeContext<'a> {
    pub config: &'a BridgeConfig,
    pub clients: &'a LedgerClients,
    pub account: &'a Account,
}

impl<'a> BridgeContext<'a> {
    pub fn new(config: &'a BridgeConfig, clients: &'a LedgerClients, account: &'a Account) -> Self {
        Self {
            config,
            clients,
            account,
        }
    }

    /// The bridge service address (`BRIDGE_ADDR`).
    pub fn bridge_address(&self) -> BridgeResult<Address> {
        parse_configured(self.config.accounts.bridge.as_deref(), "BRIDGE_ADDR")
    }

    /// The destination address carried in request notes (`ADDR`).
    pub fn destination(&self) -> BridgeResult<Address> {
        parse_configured(self.config.accounts.destination.as_deref(), "ADDR")
    }

    pub async fn submit(&self, txns: &[Transaction]) -> BridgeResult<Vec<TxId>> {
        Ok(submit_and_confirm(
            &self.clients.algod,
            txns,
            self.account,
            self.config.confirmation_rounds,
        )
        .await?)
    }

    pub async fn submit_detailed(&self, txns: &[Transaction]) -> BridgeResult<Vec<Confirmation>> {
        Ok(submit_and_confirm_detailed(
            &self.clients.algod,
            txns,
            self.account,
            self.config.confirmation_rounds,
        )
        .await?)
    }
}

/// Parse an address setting, naming `name` in the error when unset or invalid.
pub fn parse_configured(value: Option<&str>, name: &str) -> BridgeResult<Address> {
    let value = value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BridgeError::Input(format!("{} is not set", name)))?;
    value
        .parse()
        .map_err(|_| BridgeError::Input(format!("{} is not a valid address: {}", name, value)))
}

/// Read an input file holding a JSON array of asset records.
pub fn load_asset_records(path: &Path) -> BridgeResult<Vec<AssetRecord>> {
    let content = std::fs::read_to_string(path).map_err(|source| BridgeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| BridgeError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_asset_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"index": 1, "params": {{"name": "A", "unit-name": "A1", "total": 1, "decimals": 0, "url": "u"}}}}]"#
        )
        .unwrap();
        let records = load_asset_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].params.name, "A");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_asset_records(Path::new("/nonexistent/assets.json")).unwrap_err();
        assert!(matches!(err, BridgeError::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"an array\"}}").unwrap();
        let err = load_asset_records(file.path()).unwrap_err();
        assert!(matches!(err, BridgeError::Json { .. }));
        assert!(err.to_string().starts_with("Invalid JSON in"));
    }

    #[test]
    fn test_parse_configured() {
        assert!(matches!(
            parse_configured(None, "ADDR"),
            Err(BridgeError::Input(msg)) if msg == "ADDR is not set"
        ));
        assert!(parse_configured(Some(""), "ADDR").is_err());
        assert!(parse_configured(Some("nope"), "ADDR").is_err());
        let zero = Address::ZERO.to_string();
        assert_eq!(parse_configured(Some(&zero), "ADDR").unwrap(), Address::ZERO);
    }
}
