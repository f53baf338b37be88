//! Sign, broadcast, and confirm a batch of transactions.
//!
//! # Flow
//! ```text
//! [Transaction] ──sign──▶ [SignedTransaction] ──one POST──▶ algod
//!                                   │
//!                 one wait per transaction (joined, not sequential)
//!                                   ▼
//!                     [Confirmation] or every failure listed
//! ```
//!
//! A rejected batch is returned as-is; nothing is polled after it.

use futures_util::future::join_all;

use crate::ledger::algod::AlgodClient;
use crate::ledger::transaction::{SignedTransaction, Transaction};
use crate::ledger::types::{
    Confirmation, ConfirmationFailure, LedgerError, LedgerResult, TxId,
};
use crate::ledger::wallet::Account;

/// Rounds to wait for inclusion unless configured otherwise.
pub const DEFAULT_CONFIRMATION_ROUNDS: u64 = 4;

/// Wait until `tx_id` is included, for at most `rounds` rounds.
pub async fn wait_for_confirmation(
    algod: &AlgodClient,
    tx_id: &TxId,
    rounds: u64,
) -> LedgerResult<Confirmation> {
    let start = algod.status().await?.last_round.saturating_add(1);
    let end = start.saturating_add(rounds);
    let mut current = start;

    while current < end {
        // A node behind a load balancer may not know the transaction yet.
        match algod.pending_transaction(tx_id).await {
            Ok(pending) => {
                if let Some(round) = pending.confirmed() {
                    tracing::info!(tx_id = %tx_id, round, "Transaction confirmed");
                    return Ok(Confirmation {
                        tx_id: tx_id.clone(),
                        confirmed_round: round,
                        asset_index: pending.asset_index,
                    });
                }
                if !pending.pool_error.is_empty() {
                    return Err(LedgerError::PoolRejected {
                        tx_id: tx_id.clone(),
                        reason: pending.pool_error,
                    });
                }
            }
            Err(e) => {
                tracing::debug!(tx_id = %tx_id, round = current, error = %e, "Pending lookup failed");
            }
        }

        tracing::debug!(tx_id = %tx_id, round = current, "Waiting for inclusion");
        algod.status_after_block(current).await?;
        current += 1;
    }

    Err(LedgerError::ConfirmationTimeout {
        tx_id: tx_id.clone(),
        rounds,
    })
}

/// Sign every transaction with `account`, preserving order.
pub fn sign_all(txns: &[Transaction], account: &Account) -> LedgerResult<Vec<SignedTransaction>> {
    txns.iter().map(|t| t.sign(account)).collect()
}

/// Sign, broadcast as one batch, and wait for every transaction.
///
/// Returns one [`Confirmation`] per input transaction, in input order. When
/// any wait fails, all failures are reported together in
/// [`LedgerError::Unconfirmed`].
pub async fn submit_and_confirm_detailed(
    algod: &AlgodClient,
    txns: &[Transaction],
    account: &Account,
    rounds: u64,
) -> LedgerResult<Vec<Confirmation>> {
    if txns.is_empty() {
        return Err(LedgerError::Submission("no transactions to submit".to_string()));
    }

    let signed = sign_all(txns, account)?;
    let ids: Vec<&TxId> = signed.iter().map(|s| &s.tx_id).collect();
    tracing::info!(count = signed.len(), tx_ids = ?ids, "Broadcasting batch");

    algod.send_raw_transactions(&signed).await?;

    let results = join_all(
        signed
            .iter()
            .map(|s| wait_for_confirmation(algod, &s.tx_id, rounds)),
    )
    .await;

    let total = signed.len();
    let mut confirmations = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (s, result) in signed.iter().zip(results) {
        match result {
            Ok(confirmation) => confirmations.push(confirmation),
            Err(error) => {
                tracing::warn!(tx_id = %s.tx_id, error = %error, "Transaction did not confirm");
                failures.push(ConfirmationFailure {
                    tx_id: s.tx_id.clone(),
                    error: Box::new(error),
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(confirmations)
    } else {
        Err(LedgerError::Unconfirmed { total, failures })
    }
}

/// Sign, broadcast, and confirm; returns the transaction ids in input order.
pub async fn submit_and_confirm(
    algod: &AlgodClient,
    txns: &[Transaction],
    account: &Account,
    rounds: u64,
) -> LedgerResult<Vec<TxId>> {
    let confirmations = submit_and_confirm_detailed(algod, txns, account, rounds).await?;
    Ok(confirmations.into_iter().map(|c| c.tx_id).collect())
}
