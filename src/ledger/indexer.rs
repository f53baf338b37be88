//! Query service (indexer) client and the records it returns.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::schema::BridgeConfig;
use crate::ledger::address::Address;
use crate::ledger::service::ServiceClient;
use crate::ledger::types::{LedgerResult, TxId};
use crate::network::ServiceEndpoint;

/// Header carrying the indexer API token.
pub const INDEXER_TOKEN_HEADER: &str = "X-Indexer-API-Token";

/// Asset parameters as published by the indexer. Unknown fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecordParams {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "unit-name", default)]
    pub unit_name: String,

    #[serde(default)]
    pub total: u64,

    #[serde(default)]
    pub decimals: u32,

    #[serde(default)]
    pub url: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An asset record: index plus params, as in input files and indexer answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub index: u64,

    pub params: AssetRecordParams,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssetRecord {
    /// Single-unit assets are NFTs.
    pub fn is_nft(&self) -> bool {
        self.params.total == 1
    }
}

/// An account's holding of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetHolding {
    #[serde(rename = "asset-id")]
    pub asset_id: u64,

    pub amount: u64,

    #[serde(rename = "is-frozen", default)]
    pub is_frozen: bool,
}

/// Payment fields of an indexed transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentDetails {
    pub amount: u64,
    pub receiver: String,
}

/// A transaction as returned by the indexer.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedTransaction {
    pub id: TxId,

    #[serde(rename = "tx-type")]
    pub tx_type: String,

    pub sender: String,

    #[serde(rename = "confirmed-round", default)]
    pub confirmed_round: u64,

    /// Base64 note payload.
    #[serde(default)]
    pub note: Option<String>,

    #[serde(rename = "payment-transaction", default)]
    pub payment: Option<PaymentDetails>,

    #[serde(rename = "created-asset-index", default)]
    pub created_asset_index: Option<u64>,
}

impl IndexedTransaction {
    /// Decoded note bytes; empty when absent or not valid base64.
    pub fn note_bytes(&self) -> Vec<u8> {
        self.note
            .as_deref()
            .and_then(|n| BASE64.decode(n).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct AccountAssetsPage {
    #[serde(default)]
    assets: Vec<AssetHolding>,
    #[serde(rename = "next-token", default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedAssetsPage {
    #[serde(default)]
    assets: Vec<AssetRecord>,
}

#[derive(Debug, Deserialize)]
struct TransactionLookup {
    transaction: IndexedTransaction,
}

#[derive(Debug, Deserialize)]
struct AssetLookup {
    asset: AssetRecord,
}

/// A page of transaction search results.
#[derive(Debug, Deserialize)]
pub struct TransactionPage {
    #[serde(default)]
    pub transactions: Vec<IndexedTransaction>,

    #[serde(rename = "current-round", default)]
    pub current_round: u64,

    #[serde(rename = "next-token", default)]
    pub next_token: Option<String>,
}

/// Client for the historical query service.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    service: ServiceClient,
}

impl IndexerClient {
    pub fn new(endpoint: &ServiceEndpoint, config: &BridgeConfig) -> LedgerResult<Self> {
        let service = ServiceClient::new(
            "indexer",
            endpoint,
            INDEXER_TOKEN_HEADER,
            config.timeouts.request_secs,
            config.retries.clone(),
        )?;
        tracing::debug!(url = %service.base_url(), "indexer client ready");
        Ok(Self { service })
    }

    /// Every asset held by `address`, following pagination.
    pub async fn lookup_account_assets(&self, address: &Address) -> LedgerResult<Vec<AssetHolding>> {
        let path = format!("/v2/accounts/{}/assets", address);
        let mut holdings = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let query: Vec<(&str, String)> = next.iter().map(|t| ("next", t.clone())).collect();
            let page: AccountAssetsPage = self.service.get_json(&path, &query).await?;
            let empty = page.assets.is_empty();
            holdings.extend(page.assets);
            match page.next_token {
                Some(token) if !empty => next = Some(token),
                _ => break,
            }
        }

        tracing::debug!(address = %address, count = holdings.len(), "Account assets loaded");
        Ok(holdings)
    }

    /// Assets created by `address` (first page, at most `limit`).
    pub async fn lookup_account_created_assets(
        &self,
        address: &Address,
        limit: Option<u64>,
    ) -> LedgerResult<Vec<AssetRecord>> {
        let path = format!("/v2/accounts/{}/created-assets", address);
        let query: Vec<(&str, String)> = limit.iter().map(|l| ("limit", l.to_string())).collect();
        let page: CreatedAssetsPage = self.service.get_json(&path, &query).await?;
        Ok(page.assets)
    }

    pub async fn lookup_transaction(&self, tx_id: &TxId) -> LedgerResult<IndexedTransaction> {
        let lookup: TransactionLookup = self
            .service
            .get_json(&format!("/v2/transactions/{}", tx_id), &[])
            .await?;
        Ok(lookup.transaction)
    }

    pub async fn lookup_asset(&self, asset_id: u64) -> LedgerResult<AssetRecord> {
        let lookup: AssetLookup = self
            .service
            .get_json(&format!("/v2/assets/{}", asset_id), &[])
            .await?;
        Ok(lookup.asset)
    }

    /// Payments involving `address` confirmed at or after `min_round`.
    pub async fn search_payments(
        &self,
        address: &Address,
        min_round: u64,
        next: Option<&str>,
    ) -> LedgerResult<TransactionPage> {
        let mut query = vec![
            ("address", address.to_string()),
            ("tx-type", "pay".to_string()),
            ("min-round", min_round.to_string()),
        ];
        if let Some(token) = next {
            query.push(("next", token.to_string()));
        }
        self.service.get_json("/v2/transactions", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_record_keeps_unknown_fields() {
        let json = r#"{
            "index": 123,
            "created-at-round": 5,
            "deleted": false,
            "params": {
                "creator": "CREATOR",
                "name": "Walker #7",
                "unit-name": "WALK7",
                "total": 1,
                "decimals": 0,
                "url": "ipfs://bafy#arc3"
            }
        }"#;
        let record: AssetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.index, 123);
        assert_eq!(record.params.unit_name, "WALK7");
        assert!(record.is_nft());
        assert_eq!(record.extra["created-at-round"], 5);
        assert_eq!(record.params.extra["creator"], "CREATOR");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["params"]["creator"], "CREATOR");
        assert_eq!(back["params"]["unit-name"], "WALK7");
        assert_eq!(back["deleted"], false);
    }

    #[test]
    fn test_minimal_asset_record() {
        let record: AssetRecord =
            serde_json::from_str(r#"{"index": 9, "params": {"total": 100}}"#).unwrap();
        assert!(!record.is_nft());
        assert!(record.params.name.is_empty());
    }

    #[test]
    fn test_indexed_transaction_note() {
        let txn: IndexedTransaction = serde_json::from_str(
            r#"{
                "id": "TXID",
                "tx-type": "pay",
                "sender": "SENDER",
                "confirmed-round": 10,
                "note": "SGVsbG8gd29ybGQ=",
                "payment-transaction": {"amount": 300000, "receiver": "BRIDGE"}
            }"#,
        )
        .unwrap();
        assert_eq!(txn.note_bytes(), b"Hello world");
        assert_eq!(txn.payment.unwrap().amount, 300_000);
    }
}
