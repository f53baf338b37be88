//! Clone a collection from the collection network onto the operator network.
//!
//! # Data Flow
//! ```text
//! created assets of <collection> on the collection network (first 10)
//!     → keep single-unit assets
//!     → asset creation on the operator network, one confirmed at a time
//!     → indexer record of the new asset + origin fields
//!     → <out_dir>/<name>.json
//! ```

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::bridge::{BridgeContext, BridgeError, BridgeResult};
use crate::ledger::{Address, AssetParams, AssetRecord, LedgerClients, LedgerError, Transaction};

/// Assets cloned per run.
pub const CLONE_LIMIT: u64 = 10;

/// Directory collection files are written to by default.
pub const DEFAULT_OUT_DIR: &str = "collections";

/// A cloned asset: the new record plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClonedAsset {
    #[serde(flatten)]
    pub asset: AssetRecord,

    #[serde(rename = "originAssetId")]
    pub origin_asset_id: u64,

    #[serde(rename = "originNode")]
    pub origin_node: String,
}

/// What a clone run produced.
#[derive(Debug, Clone)]
pub struct CloneReport {
    pub path: PathBuf,
    pub assets: Vec<ClonedAsset>,
}

/// The collection name becomes a file name; keep it inside `out_dir`.
pub fn collection_path(out_dir: &Path, name: &str) -> BridgeResult<PathBuf> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(BridgeError::Input(format!(
            "Invalid collection name: {:?}",
            name
        )));
    }
    Ok(out_dir.join(format!("{}.json", name)))
}

/// Parameters for the copy of `origin`, controlled entirely by `operator`.
pub fn cloned_params(origin: &AssetRecord, operator: Address) -> AssetParams {
    AssetParams {
        name: origin.params.name.clone(),
        url: origin.params.url.clone(),
        clawback: Some(operator),
        decimals: origin.params.decimals,
        default_frozen: false,
        freeze: Some(operator),
        manager: Some(operator),
        reserve: Some(operator),
        total: origin.params.total,
        unit_name: origin.params.unit_name.clone(),
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    ProgressBar::new(len).with_style(style)
}

/// Clone the NFTs created by `collection` on `source` into the operator
/// account, then write the new records to `<out_dir>/<name>.json`.
pub async fn clone_collection(
    ctx: &BridgeContext<'_>,
    source: &LedgerClients,
    collection: &Address,
    name: &str,
    out_dir: &Path,
) -> BridgeResult<CloneReport> {
    let path = collection_path(out_dir, name)?;
    let operator = ctx.account.address();
    let origin_node = source.endpoints.network.to_string();

    let created = source
        .indexer
        .lookup_account_created_assets(collection, Some(CLONE_LIMIT))
        .await?;
    let candidates: Vec<&AssetRecord> = created
        .iter()
        .take(CLONE_LIMIT as usize)
        .filter(|a| {
            if !a.is_nft() {
                tracing::info!(asset_id = a.index, total = a.params.total, "Skipping non-NFT asset");
            }
            a.is_nft()
        })
        .collect();
    tracing::info!(
        collection = %collection,
        found = created.len(),
        cloning = candidates.len(),
        "Cloning collection"
    );

    let bar = progress_bar(candidates.len() as u64);
    let mut assets = Vec::with_capacity(candidates.len());
    for origin in candidates {
        bar.set_message(origin.params.name.clone());

        let params = ctx.clients.algod.suggested_params().await?;
        let txn = Transaction::asset_create(operator, cloned_params(origin, operator), &params)?;
        let confirmation = ctx
            .submit_detailed(&[txn])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::Input("empty confirmation list".to_string()))?;

        let asset_id = match confirmation.asset_index {
            Some(id) => id,
            None => ctx
                .clients
                .indexer
                .lookup_transaction(&confirmation.tx_id)
                .await?
                .created_asset_index
                .ok_or_else(|| BridgeError::MissingCreatedAsset(confirmation.tx_id.clone()))?,
        };

        let asset = match ctx.clients.indexer.lookup_asset(asset_id).await {
            Ok(record) => record,
            Err(LedgerError::Http { status: 404, .. }) => {
                tracing::warn!(asset_id, "New asset not indexed yet, recording local copy");
                AssetRecord {
                    index: asset_id,
                    ..origin.clone()
                }
            }
            Err(e) => return Err(e.into()),
        };

        bar.println(format!("Cloned {} -> {}", origin.index, asset_id));
        assets.push(ClonedAsset {
            asset,
            origin_asset_id: origin.index,
            origin_node: origin_node.clone(),
        });
        bar.inc(1);
    }
    bar.finish_with_message("done");

    write_collection(&path, &assets)?;
    println!("Wrote {} assets to {}", assets.len(), path.display());
    Ok(CloneReport { path, assets })
}

fn write_collection(path: &Path, assets: &[ClonedAsset]) -> BridgeResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| BridgeError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(assets).map_err(|source| BridgeError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| BridgeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
