//! Submission service (algod) client.
//!
//! # Responsibilities
//! - Fetch suggested transaction parameters
//! - Broadcast signed transaction batches
//! - Report node status and pending transaction state

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

use crate::config::schema::BridgeConfig;
use crate::ledger::service::ServiceClient;
use crate::ledger::transaction::{SignedTransaction, SuggestedParams};
use crate::ledger::types::{LedgerError, LedgerResult, TxId};
use crate::network::ServiceEndpoint;

/// Header carrying the algod API token.
pub const ALGOD_TOKEN_HEADER: &str = "X-Algo-API-Token";

#[derive(Debug, Deserialize)]
struct TransactionParamsResponse {
    fee: u64,
    #[serde(rename = "genesis-hash")]
    genesis_hash: String,
    #[serde(rename = "genesis-id")]
    genesis_id: String,
    #[serde(rename = "last-round")]
    last_round: u64,
    #[serde(rename = "min-fee")]
    min_fee: u64,
}

#[derive(Debug, Deserialize)]
struct PostTransactionsResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

/// Node status as reported by algod.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatus {
    #[serde(rename = "last-round")]
    pub last_round: u64,
}

/// State of a transaction in the node's pool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingTransaction {
    #[serde(rename = "confirmed-round", default)]
    pub confirmed_round: Option<u64>,

    #[serde(rename = "pool-error", default)]
    pub pool_error: String,

    #[serde(rename = "asset-index", default)]
    pub asset_index: Option<u64>,
}

impl PendingTransaction {
    /// The round the transaction was included in, if any.
    pub fn confirmed(&self) -> Option<u64> {
        self.confirmed_round.filter(|r| *r > 0)
    }
}

/// Client for the transaction-submission service.
#[derive(Debug, Clone)]
pub struct AlgodClient {
    service: ServiceClient,
}

impl AlgodClient {
    pub fn new(endpoint: &ServiceEndpoint, config: &BridgeConfig) -> LedgerResult<Self> {
        let service = ServiceClient::new(
            "algod",
            endpoint,
            ALGOD_TOKEN_HEADER,
            config.timeouts.request_secs,
            config.retries.clone(),
        )?;
        tracing::debug!(url = %service.base_url(), "algod client ready");
        Ok(Self { service })
    }

    /// Current fee and validity parameters.
    pub async fn suggested_params(&self) -> LedgerResult<SuggestedParams> {
        let response: TransactionParamsResponse =
            self.service.get_json("/v2/transactions/params", &[]).await?;

        let hash = BASE64
            .decode(&response.genesis_hash)
            .map_err(|e| LedgerError::Encoding(format!("Invalid genesis hash: {}", e)))?;
        let genesis_hash: [u8; 32] = hash
            .try_into()
            .map_err(|_| LedgerError::Encoding("Genesis hash is not 32 bytes".to_string()))?;

        Ok(SuggestedParams::from_round(
            response.last_round,
            response.fee,
            response.min_fee,
            response.genesis_id,
            genesis_hash,
        ))
    }

    /// Broadcast signed transactions as one batch. Rejections are not retried.
    pub async fn send_raw_transactions(&self, batch: &[SignedTransaction]) -> LedgerResult<TxId> {
        let body: Vec<u8> = batch.iter().flat_map(|s| s.blob.iter().copied()).collect();
        let response: PostTransactionsResponse = self
            .service
            .post_binary("/v2/transactions", body)
            .await
            .map_err(|e| match e {
                LedgerError::Http { message, .. } => LedgerError::Submission(message),
                other => other,
            })?;
        Ok(TxId(response.tx_id))
    }

    pub async fn status(&self) -> LedgerResult<NodeStatus> {
        self.service.get_json("/v2/status", &[]).await
    }

    /// Block until the node has seen a round after `round`.
    pub async fn status_after_block(&self, round: u64) -> LedgerResult<NodeStatus> {
        self.service
            .get_json(&format!("/v2/status/wait-for-block-after/{}", round), &[])
            .await
    }

    pub async fn pending_transaction(&self, tx_id: &TxId) -> LedgerResult<PendingTransaction> {
        self.service
            .get_json(
                &format!("/v2/transactions/pending/{}", tx_id),
                &[("format", "json".to_string())],
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_decoding() {
        let pending: PendingTransaction =
            serde_json::from_str(r#"{"pool-error":"","txn":{}}"#).unwrap();
        assert_eq!(pending.confirmed(), None);

        let pending: PendingTransaction = serde_json::from_str(
            r#"{"confirmed-round":1234,"pool-error":"","asset-index":99,"txn":{}}"#,
        )
        .unwrap();
        assert_eq!(pending.confirmed(), Some(1234));
        assert_eq!(pending.asset_index, Some(99));

        let pending: PendingTransaction =
            serde_json::from_str(r#"{"confirmed-round":0,"pool-error":"overspend"}"#).unwrap();
        assert_eq!(pending.confirmed(), None);
        assert_eq!(pending.pool_error, "overspend");
    }

    #[test]
    fn test_params_decoding() {
        let response: TransactionParamsResponse = serde_json::from_str(
            r#"{
                "consensus-version": "future",
                "fee": 0,
                "genesis-hash": "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=",
                "genesis-id": "testnet-v1.0",
                "last-round": 40000000,
                "min-fee": 1000
            }"#,
        )
        .unwrap();
        assert_eq!(response.last_round, 40_000_000);
        assert_eq!(BASE64.decode(&response.genesis_hash).unwrap().len(), 32);
    }
}
