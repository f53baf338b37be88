//! Command-line interface.
//!
//! Every endpoint and account option can also come from the environment
//! variable named after it. Mnemonics are read from the environment only.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::bridge::clone::DEFAULT_OUT_DIR;
use crate::config::ConfigOverrides;

/// Environment variable holding the operator mnemonic.
pub const OPERATOR_MNEMONIC_VAR: &str = "MN";

/// Additional accounts whose addresses are reported at startup.
pub const EXTRA_MNEMONIC_VARS: [&str; 2] = ["MN2", "MN3"];

#[derive(Debug, Parser)]
#[command(name = "nft-bridge")]
#[command(version, about = "Operator toolkit for the NFT bridge", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format: pretty or json
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Network, account, and service endpoint selection.
#[derive(Debug, Args)]
pub struct EndpointArgs {
    /// Network the operator transacts on
    #[arg(long, global = true, env = "NODE")]
    pub node: Option<String>,

    /// Network collections are cloned from
    #[arg(long, global = true, env = "COLL_NODE")]
    pub coll_node: Option<String>,

    /// Destination address carried in request notes
    #[arg(long, global = true, env = "ADDR")]
    pub addr: Option<String>,

    /// Bridge service address
    #[arg(long, global = true, env = "BRIDGE_ADDR")]
    pub bridge_addr: Option<String>,

    #[arg(long, global = true, env = "ALGOD_SERVER")]
    pub algod_server: Option<String>,

    #[arg(long, global = true, env = "ALGOD_PORT")]
    pub algod_port: Option<String>,

    #[arg(long, global = true, env = "ALGOD_TOKEN", hide_env_values = true)]
    pub algod_token: Option<String>,

    #[arg(long, global = true, env = "INDEXER_SERVER")]
    pub indexer_server: Option<String>,

    #[arg(long, global = true, env = "INDEXER_PORT")]
    pub indexer_port: Option<String>,

    #[arg(long, global = true, env = "INDEXER_TOKEN", hide_env_values = true)]
    pub indexer_token: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a greeting payment to the bridge
    Hello {
        /// Also request a random asset id
        #[arg(long)]
        random_request: bool,
    },
    /// Pay the bridge fee for every asset in a JSON file
    Request {
        /// JSON array of asset records
        infile: PathBuf,

        /// Records to skip from the start of the file
        #[arg(long, default_value_t = 0)]
        skip: usize,

        /// Records to process after skipping
        #[arg(long)]
        take: Option<usize>,
    },
    /// Transfer every held asset in a JSON file to the bridge
    Transfer {
        /// JSON array of asset records
        infile: PathBuf,
    },
    /// Copy a collection from the collection network to the operator account
    ///
    /// ALGOD_* and INDEXER_* overrides apply to the operator network only.
    /// Endpoints of a separate collection network come from the
    /// [collection_network] table of the config file.
    #[command(name = "clone")]
    CloneCollection {
        /// Collection name, used for the output file name
        name: String,

        /// Creator address of the collection
        collection_addr: String,

        /// Directory the collection file is written to
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out_dir: PathBuf,
    },
    /// Opt the operator account in to an asset
    OptIn {
        asset_id: u64,
    },
    /// Follow incoming bridge requests until interrupted
    Watch {
        /// First round to scan
        #[arg(long, default_value_t = 0)]
        from_round: u64,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let e = &self.endpoints;
        ConfigOverrides {
            node: e.node.clone(),
            collection_node: e.coll_node.clone(),
            destination: e.addr.clone(),
            bridge: e.bridge_addr.clone(),
            algod_server: e.algod_server.clone(),
            algod_port: e.algod_port.clone(),
            algod_token: e.algod_token.clone(),
            indexer_server: e.indexer_server.clone(),
            indexer_port: e.indexer_port.clone(),
            indexer_token: e.indexer_token.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Hello { .. } => "hello",
            Commands::Request { .. } => "request",
            Commands::Transfer { .. } => "transfer",
            Commands::CloneCollection { .. } => "clone",
            Commands::OptIn { .. } => "opt-in",
            Commands::Watch { .. } => "watch",
        }
    }
}
