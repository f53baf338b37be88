//! Ledger-specific types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::EndpointError;

/// Maximum note payload accepted by the ledger, in bytes.
pub const MAX_NOTE_LEN: usize = 1024;

/// Transaction identifier: unpadded base32 of the transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A transaction that made it into a ledger round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_id: TxId,
    pub confirmed_round: u64,
    /// Index of the asset created by this transaction, if any.
    pub asset_index: Option<u64>,
}

/// One transaction of a batch that did not confirm.
#[derive(Debug)]
pub struct ConfirmationFailure {
    pub tx_id: TxId,
    pub error: Box<LedgerError>,
}

impl fmt::Display for ConfirmationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tx_id, self.error)
    }
}

fn describe_failures(failures: &[ConfirmationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The submission service rejected the batch.
    #[error("Transaction batch rejected: {0}")]
    Submission(String),

    /// Transaction was not included within the round budget.
    #[error("Transaction {tx_id} not confirmed after {rounds} rounds")]
    ConfirmationTimeout { tx_id: TxId, rounds: u64 },

    /// Transaction was dropped from the pool.
    #[error("Transaction {tx_id} rejected by the pool: {reason}")]
    PoolRejected { tx_id: TxId, reason: String },

    /// Some transactions of a batch failed to confirm; every failure is listed.
    #[error(
        "{} of {total} transactions failed to confirm: {}",
        .failures.len(),
        describe_failures(.failures)
    )]
    Unconfirmed {
        total: usize,
        failures: Vec<ConfirmationFailure>,
    },

    /// Connection or protocol failure talking to a service.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Malformed response or unencodable transaction.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid mnemonic or key material.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Text that is not a valid account address.
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Note exceeds the ledger limit.
    #[error("Note is {0} bytes, limit is {max}", max = MAX_NOTE_LEN)]
    NoteTooLong(usize),

    /// Endpoint could not be turned into a URL.
    #[error(transparent)]
    InvalidEndpoint(#[from] EndpointError),
}

impl LedgerError {
    /// Whether repeating the same read may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LedgerError::Rpc(_) | LedgerError::Timeout(_) => true,
            LedgerError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = LedgerError::ConfirmationTimeout {
            tx_id: TxId::from("ABC"),
            rounds: 4,
        };
        assert_eq!(err.to_string(), "Transaction ABC not confirmed after 4 rounds");
    }

    #[test]
    fn test_unconfirmed_lists_every_failure() {
        let err = LedgerError::Unconfirmed {
            total: 3,
            failures: vec![
                ConfirmationFailure {
                    tx_id: TxId::from("A"),
                    error: Box::new(LedgerError::ConfirmationTimeout {
                        tx_id: TxId::from("A"),
                        rounds: 4,
                    }),
                },
                ConfirmationFailure {
                    tx_id: TxId::from("B"),
                    error: Box::new(LedgerError::PoolRejected {
                        tx_id: TxId::from("B"),
                        reason: "overspend".to_string(),
                    }),
                },
            ],
        };
        let text = err.to_string();
        assert!(text.starts_with("2 of 3 transactions failed to confirm"));
        assert!(text.contains("A: Transaction A not confirmed"));
        assert!(text.contains("overspend"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(LedgerError::Timeout(5).is_transient());
        assert!(LedgerError::Rpc("reset".into()).is_transient());
        assert!(LedgerError::Http { status: 503, message: String::new() }.is_transient());
        assert!(!LedgerError::Http { status: 404, message: String::new() }.is_transient());
        assert!(!LedgerError::Submission("overspend".into()).is_transient());
    }
}
