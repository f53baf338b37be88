//! Opt the operator account in to an asset.

use crate::bridge::{BridgeContext, BridgeResult};
use crate::ledger::{Transaction, TxId};

/// Send a zero-amount transfer of `asset_id` to self.
///
/// Returns `None` when the account already holds the asset.
pub async fn opt_in(ctx: &BridgeContext<'_>, asset_id: u64) -> BridgeResult<Option<TxId>> {
    let me = ctx.account.address();
    let holdings = ctx.clients.indexer.lookup_account_assets(&me).await?;
    if holdings.iter().any(|h| h.asset_id == asset_id) {
        println!("Already opted in to asset {}", asset_id);
        return Ok(None);
    }

    let params = ctx.clients.algod.suggested_params().await?;
    let txn = Transaction::asset_transfer(me, me, asset_id, 0, Vec::new(), &params)?;
    let sent = ctx.submit(&[txn]).await?;
    println!("Opted in to asset {}: {}", asset_id, sent[0]);
    Ok(sent.into_iter().next())
}
