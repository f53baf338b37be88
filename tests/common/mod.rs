//! Shared utilities for integration testing: a programmable mock ledger.
//!
//! One axum server answers both the algod and the indexer routes, so a test
//! can point both services at the same base URL.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use nft_bridge::config::BridgeConfig;
use nft_bridge::ledger::{Account, Address, LedgerClients};

/// Genesis hash of testnet, base64.
pub const GENESIS_HASH: &str = "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=";

/// Programmable ledger state. Every field can be changed while serving.
#[derive(Default)]
pub struct MockLedger {
    /// POST /v2/transactions calls.
    pub submissions: AtomicUsize,
    /// Body size of each POST.
    pub submitted_bytes: Mutex<Vec<usize>>,
    /// GET /v2/transactions/pending/{id} calls.
    pub pending_polls: AtomicUsize,
    /// Reject every batch with this message.
    pub reject: Mutex<Option<String>>,
    /// Report this pool error for every pending transaction.
    pub pool_error: Mutex<Option<String>>,
    /// Polls of one transaction before it confirms; 0 never confirms.
    pub confirm_after: AtomicUsize,
    /// Answer this many initial pending polls with 404, as a lagging node does.
    pub pending_not_found: AtomicUsize,
    /// Transaction ids that stay pending forever.
    pub never_confirm: Mutex<HashSet<String>>,
    /// Delay of every wait-for-block call, in milliseconds.
    pub block_delay_ms: AtomicU64,
    /// Report a created asset index on confirmation.
    pub assign_asset_index: Mutex<bool>,
    pub next_asset_index: AtomicU64,
    pub last_round: AtomicU64,
    polls_per_tx: Mutex<HashMap<String, usize>>,
    asset_per_tx: Mutex<HashMap<String, u64>>,
    /// Holdings by account address.
    pub holdings: Mutex<HashMap<String, Vec<Value>>>,
    /// Created asset records by creator address.
    pub created: Mutex<HashMap<String, Vec<Value>>>,
    /// Asset records served by /v2/assets/{id}.
    pub assets: Mutex<HashMap<u64, Value>>,
    /// Indexed payments served by the transaction search.
    pub payments: Mutex<Vec<Value>>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        let ledger = Self {
            confirm_after: AtomicUsize::new(1),
            next_asset_index: AtomicU64::new(1000),
            last_round: AtomicU64::new(100),
            ..Default::default()
        };
        Arc::new(ledger)
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn pending_polls(&self) -> usize {
        self.pending_polls.load(Ordering::SeqCst)
    }

    pub fn set_holdings(&self, address: &Address, holdings: &[(u64, u64)]) {
        let values = holdings
            .iter()
            .map(|(id, amount)| json!({"asset-id": id, "amount": amount, "is-frozen": false}))
            .collect();
        self.holdings
            .lock()
            .unwrap()
            .insert(address.to_string(), values);
    }
}

/// A running mock ledger.
pub struct MockServer {
    pub addr: SocketAddr,
    pub ledger: Arc<MockLedger>,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration pointing both services at this server.
    pub fn config(&self) -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.network.algod.server = Some(self.url());
        config.network.indexer.server = Some(self.url());
        config.network.algod.token = Some("algod-token".to_string());
        config.timeouts.request_secs = 5;
        config.retries.base_delay_ms = 10;
        config.retries.max_delay_ms = 50;
        config.watch.interval_secs = 1;
        config.accounts.bridge = Some(bridge_address().to_string());
        config.accounts.destination = Some(destination_address().to_string());
        config
    }

    pub fn clients(&self, config: &BridgeConfig) -> LedgerClients {
        LedgerClients::connect(&config.network, config).unwrap()
    }
}

pub fn operator() -> Account {
    Account::from_seed(&[9u8; 32])
}

pub fn bridge_address() -> Address {
    Address([7u8; 32])
}

pub fn destination_address() -> Address {
    Address([3u8; 32])
}

/// Start the mock ledger on an ephemeral port.
pub async fn start_mock_ledger() -> MockServer {
    let ledger = MockLedger::new();
    let app = Router::new()
        .route("/v2/transactions/params", get(params))
        .route("/v2/transactions", get(search_transactions).post(submit))
        .route("/v2/transactions/pending/{id}", get(pending))
        .route("/v2/transactions/{id}", get(lookup_transaction))
        .route("/v2/status", get(status))
        .route("/v2/status/wait-for-block-after/{round}", get(wait_for_block))
        .route("/v2/accounts/{address}/assets", get(account_assets))
        .route("/v2/accounts/{address}/created-assets", get(created_assets))
        .route("/v2/assets/{id}", get(lookup_asset))
        .with_state(ledger.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockServer { addr, ledger }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
}

async fn params(State(ledger): State<Arc<MockLedger>>) -> Json<Value> {
    Json(json!({
        "consensus-version": "future",
        "fee": 0,
        "genesis-hash": GENESIS_HASH,
        "genesis-id": "testnet-v1.0",
        "last-round": ledger.last_round.load(Ordering::SeqCst),
        "min-fee": 1000
    }))
}

async fn submit(State(ledger): State<Arc<MockLedger>>, body: Bytes) -> Response {
    ledger.submissions.fetch_add(1, Ordering::SeqCst);
    ledger.submitted_bytes.lock().unwrap().push(body.len());

    if let Some(message) = ledger.reject.lock().unwrap().clone() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response();
    }
    Json(json!({ "txId": "MOCKTXID" })).into_response()
}

async fn status(State(ledger): State<Arc<MockLedger>>) -> Json<Value> {
    Json(json!({ "last-round": ledger.last_round.load(Ordering::SeqCst) }))
}

async fn wait_for_block(
    State(ledger): State<Arc<MockLedger>>,
    Path(round): Path<u64>,
) -> Json<Value> {
    let delay = ledger.block_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    let next = round + 1;
    ledger.last_round.fetch_max(next, Ordering::SeqCst);
    Json(json!({ "last-round": ledger.last_round.load(Ordering::SeqCst) }))
}

async fn pending(State(ledger): State<Arc<MockLedger>>, Path(id): Path<String>) -> Response {
    ledger.pending_polls.fetch_add(1, Ordering::SeqCst);

    let missing = ledger
        .pending_not_found
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if missing {
        return not_found("txn does not exist");
    }
    if let Some(error) = ledger.pool_error.lock().unwrap().clone() {
        return Json(json!({ "pool-error": error, "txn": {} })).into_response();
    }
    if ledger.never_confirm.lock().unwrap().contains(&id) {
        return Json(json!({ "pool-error": "", "txn": {} })).into_response();
    }

    let polls = {
        let mut per_tx = ledger.polls_per_tx.lock().unwrap();
        let count = per_tx.entry(id.clone()).or_insert(0);
        *count += 1;
        *count
    };
    let confirm_after = ledger.confirm_after.load(Ordering::SeqCst);
    if confirm_after == 0 || polls < confirm_after {
        return Json(json!({ "pool-error": "", "txn": {} })).into_response();
    }

    let round = ledger.last_round.load(Ordering::SeqCst);
    let mut answer = json!({ "confirmed-round": round, "pool-error": "", "txn": {} });
    if *ledger.assign_asset_index.lock().unwrap() {
        let index = *ledger
            .asset_per_tx
            .lock()
            .unwrap()
            .entry(id)
            .or_insert_with(|| ledger.next_asset_index.fetch_add(1, Ordering::SeqCst));
        answer["asset-index"] = json!(index);
    }
    Json(answer).into_response()
}

async fn lookup_transaction(
    State(ledger): State<Arc<MockLedger>>,
    Path(id): Path<String>,
) -> Response {
    let payments = ledger.payments.lock().unwrap();
    match payments.iter().find(|p| p["id"] == id) {
        Some(txn) => Json(json!({ "transaction": txn })).into_response(),
        None => not_found("no transaction found"),
    }
}

async fn search_transactions(
    State(ledger): State<Arc<MockLedger>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let min_round: u64 = query
        .get("min-round")
        .and_then(|r| r.parse().ok())
        .unwrap_or(0);
    let transactions: Vec<Value> = ledger
        .payments
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p["confirmed-round"].as_u64().unwrap_or(0) >= min_round)
        .cloned()
        .collect();
    Json(json!({
        "current-round": ledger.last_round.load(Ordering::SeqCst),
        "transactions": transactions
    }))
}

async fn account_assets(
    State(ledger): State<Arc<MockLedger>>,
    Path(address): Path<String>,
) -> Json<Value> {
    let holdings = ledger
        .holdings
        .lock()
        .unwrap()
        .get(&address)
        .cloned()
        .unwrap_or_default();
    Json(json!({ "assets": holdings, "current-round": 100 }))
}

async fn created_assets(
    State(ledger): State<Arc<MockLedger>>,
    Path(address): Path<String>,
) -> Json<Value> {
    let created = ledger
        .created
        .lock()
        .unwrap()
        .get(&address)
        .cloned()
        .unwrap_or_default();
    Json(json!({ "assets": created, "current-round": 100 }))
}

async fn lookup_asset(State(ledger): State<Arc<MockLedger>>, Path(id): Path<u64>) -> Response {
    match ledger.assets.lock().unwrap().get(&id) {
        Some(asset) => Json(json!({ "asset": asset })).into_response(),
        None => not_found("no assets found for asset-id"),
    }
}
