//! Hand held NFTs over to the bridge.
//!
//! Each asset in the input file is checked against the holdings of the
//! operator and of the bridge before anything is signed. An asset that would
//! fail on-chain is skipped and reported instead.

use std::fmt;

use crate::bridge::note::BridgeRequest;
use crate::bridge::{BridgeContext, BridgeResult};
use crate::ledger::{AssetHolding, AssetRecord, Transaction, TxId};

/// Why an asset was not transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The operator does not hold the asset.
    NotHeld,
    /// The operator is opted in but holds none.
    ZeroBalance,
    /// The bridge cannot receive the asset yet.
    BridgeNotOptedIn,
    /// The bridge already holds the unit.
    AlreadyTransferred,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NotHeld => "not found in my account",
            SkipReason::ZeroBalance => "has a zero balance in my account",
            SkipReason::BridgeNotOptedIn => "is not opted in by the bridge",
            SkipReason::AlreadyTransferred => "is already held by the bridge",
        };
        f.write_str(text)
    }
}

/// Result for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Transferred(TxId),
    Skipped(SkipReason),
}

fn holding(holdings: &[AssetHolding], asset_id: u64) -> Option<&AssetHolding> {
    holdings.iter().find(|h| h.asset_id == asset_id)
}

/// Decide whether `asset_id` can move from `mine` to `bridge`.
pub fn check_transfer(
    asset_id: u64,
    mine: &[AssetHolding],
    bridge: &[AssetHolding],
) -> Result<(), SkipReason> {
    let held = holding(mine, asset_id).ok_or(SkipReason::NotHeld)?;
    if held.amount == 0 {
        return Err(SkipReason::ZeroBalance);
    }
    let at_bridge = holding(bridge, asset_id).ok_or(SkipReason::BridgeNotOptedIn)?;
    if at_bridge.amount == 1 {
        return Err(SkipReason::AlreadyTransferred);
    }
    Ok(())
}

/// Transfer one unit of each listed asset to the bridge.
pub async fn transfer_assets(
    ctx: &BridgeContext<'_>,
    records: &[AssetRecord],
) -> BridgeResult<Vec<(u64, TransferOutcome)>> {
    let me = ctx.account.address();
    let bridge = ctx.bridge_address()?;
    let destination = ctx.destination()?;

    let mine = ctx.clients.indexer.lookup_account_assets(&me).await?;
    let at_bridge = ctx.clients.indexer.lookup_account_assets(&bridge).await?;

    let mut outcomes = Vec::with_capacity(records.len());
    for asset in records {
        if let Err(reason) = check_transfer(asset.index, &mine, &at_bridge) {
            println!("Asset {} {}", asset.index, reason);
            tracing::debug!(asset_id = asset.index, ?reason, "Transfer skipped");
            outcomes.push((asset.index, TransferOutcome::Skipped(reason)));
            continue;
        }

        let note = BridgeRequest::new(asset.index, &destination).to_note()?;
        let params = ctx.clients.algod.suggested_params().await?;
        let txn = Transaction::asset_transfer(me, bridge, asset.index, 1, note, &params)?;
        let sent = ctx.submit(&[txn]).await?;
        println!("Asset {} transferred: {}", asset.index, sent[0]);
        outcomes.push((asset.index, TransferOutcome::Transferred(sent[0].clone())));
    }

    Ok(outcomes)
}
