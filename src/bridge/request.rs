//! Greeting and bridge request payments.

use rand::Rng;

use crate::bridge::note::BridgeRequest;
use crate::bridge::{BridgeContext, BridgeResult};
use crate::ledger::{AssetRecord, SuggestedParams, Transaction, TxId};

/// Network fee covered by a request payment, in µAlgo.
pub const TRANSACTION_FEE: u64 = 201_000;

/// Network fee covered by the random request sent after a greeting.
pub const HELLO_TRANSACTION_FEE: u64 = 101_000;

/// Bridge service fee, in µAlgo.
pub const SERVICE_FEE: u64 = 99_000;

/// Note of the greeting payment.
pub const HELLO_NOTE: &[u8] = b"Hello world";

/// Upper bound (exclusive) of randomly chosen asset ids.
pub const RANDOM_ASSET_ID_BOUND: u64 = 10_000_000_000;

/// Amount paid to the bridge with every request.
pub const fn request_payment() -> u64 {
    TRANSACTION_FEE + SERVICE_FEE
}

/// Amount paid with the random request of `hello`.
pub const fn hello_request_payment() -> u64 {
    HELLO_TRANSACTION_FEE + SERVICE_FEE
}

/// Slice of the input file to process.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordWindow {
    pub skip: usize,
    pub take: Option<usize>,
}

impl RecordWindow {
    pub fn apply<'a, T>(&self, records: &'a [T]) -> &'a [T] {
        let start = self.skip.min(records.len());
        let end = match self.take {
            Some(take) => start.saturating_add(take).min(records.len()),
            None => records.len(),
        };
        &records[start..end]
    }
}

/// Build the payment of `amount` that asks the bridge for `asset_id`.
pub fn request_transaction(
    ctx: &BridgeContext<'_>,
    asset_id: u64,
    amount: u64,
    params: &SuggestedParams,
) -> BridgeResult<Transaction> {
    let note = BridgeRequest::new(asset_id, &ctx.destination()?).to_note()?;
    Ok(Transaction::payment(
        ctx.account.address(),
        ctx.bridge_address()?,
        amount,
        note,
        params,
    )?)
}

/// Send a zero-amount greeting to the bridge, then optionally request a
/// random asset.
pub async fn hello(ctx: &BridgeContext<'_>, random_request: bool) -> BridgeResult<Vec<TxId>> {
    let bridge = ctx.bridge_address()?;
    let params = ctx.clients.algod.suggested_params().await?;
    let greeting = Transaction::payment(
        ctx.account.address(),
        bridge,
        0,
        HELLO_NOTE.to_vec(),
        &params,
    )?;

    let mut ids = ctx.submit(&[greeting]).await?;
    println!("Hello sent: {}", ids[0]);

    if random_request {
        let asset_id = rand::thread_rng().gen_range(0..RANDOM_ASSET_ID_BOUND);
        tracing::info!(asset_id, "Requesting random asset");
        let params = ctx.clients.algod.suggested_params().await?;
        let request = request_transaction(ctx, asset_id, hello_request_payment(), &params)?;
        let sent = ctx.submit(&[request]).await?;
        println!("Requested asset {}: {}", asset_id, sent[0]);
        ids.extend(sent);
    }

    Ok(ids)
}

/// Send one request payment per asset record, one at a time.
pub async fn request_assets(
    ctx: &BridgeContext<'_>,
    records: &[AssetRecord],
    window: RecordWindow,
) -> BridgeResult<Vec<TxId>> {
    let selected = window.apply(records);
    tracing::info!(
        total = records.len(),
        selected = selected.len(),
        "Requesting assets"
    );

    let mut ids = Vec::with_capacity(selected.len());
    for asset in selected {
        println!("Requesting {} ({})", asset.params.name, asset.index);
        let params = ctx.clients.algod.suggested_params().await?;
        let txn = request_transaction(ctx, asset.index, request_payment(), &params)?;
        let sent = ctx.submit(&[txn]).await?;
        println!("  confirmed: {}", sent[0]);
        ids.extend(sent);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::ledger::{Account, Address, LedgerClients};

    #[test]
    fn test_request_payment_total() {
        assert_eq!(request_payment(), 300_000);
        assert_eq!(hello_request_payment(), 200_000);
    }

    #[test]
    fn test_request_transaction_pays_amount() {
        let mut config = BridgeConfig::default();
        config.accounts.bridge = Some(Address([7u8; 32]).to_string());
        config.accounts.destination = Some(Address([3u8; 32]).to_string());
        let clients = LedgerClients::connect(&config.network, &config).unwrap();
        let account = Account::from_seed(&[9u8; 32]);
        let ctx = BridgeContext::new(&config, &clients, &account);
        let params = SuggestedParams::from_round(10, 0, 1000, "testnet-v1.0".into(), [0u8; 32]);

        let greeting_request =
            request_transaction(&ctx, 42, hello_request_payment(), &params).unwrap();
        assert_eq!(greeting_request.amount(), 200_000);
        assert_eq!(greeting_request.sender(), account.address());

        let request = request_transaction(&ctx, 42, request_payment(), &params).unwrap();
        assert_eq!(request.amount(), 300_000);
    }

    #[test]
    fn test_record_window() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(RecordWindow::default().apply(&items), &items);
        assert_eq!(
            RecordWindow { skip: 1, take: Some(2) }.apply(&items),
            &[2, 3]
        );
        assert_eq!(
            RecordWindow { skip: 4, take: Some(10) }.apply(&items),
            &[5]
        );
        assert!(RecordWindow { skip: 9, take: None }.apply(&items).is_empty());
    }
}
