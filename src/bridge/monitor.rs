//! Bridge request monitoring.
//!
//! Polls the indexer for payments to the bridge address and reports the ones
//! that carry a valid request. A round cursor makes each poll start where the
//! previous one ended.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;

use crate::bridge::note::{classify, IncomingRequest};
use crate::config::schema::WatchConfig;
use crate::ledger::{Address, IndexerClient, LedgerResult, TxId};
use crate::lifecycle::ShutdownSignal;

/// Follows payments to the bridge address.
pub struct RequestMonitor {
    indexer: IndexerClient,
    bridge: Address,
    min_payment: u64,
    interval: Duration,
    next_round: u64,
}

impl RequestMonitor {
    pub fn new(indexer: IndexerClient, bridge: Address, config: &WatchConfig, from_round: u64) -> Self {
        Self {
            indexer,
            bridge,
            min_payment: config.min_payment,
            interval: Duration::from_secs(config.interval_secs),
            next_round: from_round,
        }
    }

    /// First round the next poll asks for.
    pub fn next_round(&self) -> u64 {
        self.next_round
    }

    /// Fetch every new payment and return the accepted requests.
    pub async fn poll_once(&mut self) -> LedgerResult<Vec<IncomingRequest>> {
        let mut accepted = Vec::new();
        let mut highest = self.next_round.saturating_sub(1);
        let mut next: Option<String> = None;
        let mut seen: HashSet<TxId> = HashSet::new();

        loop {
            let page = self
                .indexer
                .search_payments(&self.bridge, self.next_round, next.as_deref())
                .await?;
            highest = highest.max(page.current_round);

            let empty = page.transactions.is_empty();
            for txn in page.transactions {
                highest = highest.max(txn.confirmed_round);
                if !seen.insert(txn.id.clone()) {
                    continue;
                }
                match classify(&txn, &self.bridge, self.min_payment) {
                    Ok(request) => accepted.push(request),
                    Err(reason) => {
                        tracing::debug!(tx_id = %txn.id, reason = %reason, "Ignoring payment");
                    }
                }
            }

            match page.next_token {
                Some(token) if !empty => next = Some(token),
                _ => break,
            }
        }

        self.next_round = highest + 1;
        Ok(accepted)
    }

    /// Poll until `shutdown` fires, printing each accepted request.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            bridge = %self.bridge,
            from_round = self.next_round,
            min_payment = self.min_payment,
            "Starting bridge request monitor"
        );

        while !shutdown.is_triggered() {
            match self.poll_once().await {
                Ok(requests) => {
                    for r in requests {
                        println!(
                            "Request {} in round {}: asset {} x{} to {} (paid {})",
                            r.tx_id, r.round, r.request.asset_id, r.request.amount, r.destination, r.payment
                        );
                    }
                }
                Err(e) => tracing::error!(error = %e, "Error polling bridge payments"),
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown.recv() => {}
            }
        }

        tracing::info!(next_round = self.next_round, "Bridge request monitor stopped");
    }
}
