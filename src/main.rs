//! NFT bridge operator CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   env / flags / TOML ──▶ config ──▶ network::resolve_endpoints
//!                                              │
//!                                              ▼
//!   MN ──▶ Account ──▶ bridge workflow ──▶ ledger (algod + indexer)
//!                          │                   │
//!                          │           submit-and-confirm
//!                          ▼
//!                 status lines on stdout, tracing on stderr
//! ```

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use nft_bridge::bridge::clone::clone_collection;
use nft_bridge::bridge::monitor::RequestMonitor;
use nft_bridge::bridge::opt_in::opt_in;
use nft_bridge::bridge::request::{hello, request_assets, RecordWindow};
use nft_bridge::bridge::transfer::transfer_assets;
use nft_bridge::bridge::{load_asset_records, parse_configured, BridgeContext, BridgeError};
use nft_bridge::cli::{Cli, Commands, EXTRA_MNEMONIC_VARS, OPERATOR_MNEMONIC_VAR};
use nft_bridge::config::load_config;
use nft_bridge::ledger::{Account, Address, LedgerClients};
use nft_bridge::lifecycle::{shutdown_on_signal, Shutdown};
use nft_bridge::observability::{init_logging, LogFormat};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref(), &cli.overrides())?;
    init_logging(
        &config.observability.log_level,
        LogFormat::from_str_lossy(&config.observability.log_format),
    );

    tracing::info!(
        command = cli.command.name(),
        network = %config.network.name,
        confirmation_rounds = config.confirmation_rounds,
        "nft-bridge v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let clients = LedgerClients::connect(&config.network, &config)?;

    if let Commands::Watch { from_round } = cli.command {
        let bridge = parse_configured(config.accounts.bridge.as_deref(), "BRIDGE_ADDR")?;
        let shutdown = Shutdown::new();
        let monitor = RequestMonitor::new(clients.indexer.clone(), bridge, &config.watch, from_round);
        let receiver = shutdown.subscribe();
        let _signals = shutdown_on_signal(shutdown);
        monitor.run(receiver).await;
        return Ok(());
    }

    let account = Account::from_env(OPERATOR_MNEMONIC_VAR)?;
    report_accounts(&account);
    let ctx = BridgeContext::new(&config, &clients, &account);

    match cli.command {
        Commands::Hello { random_request } => {
            hello(&ctx, random_request).await?;
        }
        Commands::Request { infile, skip, take } => {
            let records = load_asset_records(&infile)?;
            request_assets(&ctx, &records, RecordWindow { skip, take }).await?;
        }
        Commands::Transfer { infile } => {
            let records = load_asset_records(&infile)?;
            transfer_assets(&ctx, &records).await?;
        }
        Commands::CloneCollection {
            name,
            collection_addr,
            out_dir,
        } => {
            let collection: Address = collection_addr.parse().map_err(|_| {
                BridgeError::Input(format!("Invalid collection address: {}", collection_addr))
            })?;
            let source = LedgerClients::connect(config.collection_network(), &config)?;
            clone_collection(&ctx, &source, &collection, &name, &out_dir).await?;
        }
        Commands::OptIn { asset_id } => {
            opt_in(&ctx, asset_id).await?;
        }
        Commands::Watch { .. } => {}
    }

    Ok(())
}

fn report_accounts(operator: &Account) {
    println!("My address: {}", operator.address());
    for var in EXTRA_MNEMONIC_VARS {
        if std::env::var_os(var).is_none() {
            continue;
        }
        match Account::from_env(var) {
            Ok(account) => println!("{} address: {}", var, account.address()),
            Err(e) => tracing::warn!(variable = var, error = %e, "Ignoring invalid mnemonic"),
        }
    }
}
