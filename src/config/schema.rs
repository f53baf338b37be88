//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge tools.
//! All types derive Serde traits for deserialization from TOML files. Secrets
//! (mnemonics) are not part of the schema; they only arrive through the
//! environment.

use serde::{Deserialize, Serialize};

use crate::network::{EndpointOverrides, Network};

/// Root configuration for the bridge operator commands.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Network the operator account transacts on.
    pub network: NetworkConfig,

    /// Network a collection is cloned from (`COLL_NODE`).
    pub collection_network: Option<NetworkConfig>,

    /// Well-known accounts.
    pub accounts: AccountsConfig,

    /// Rounds to wait for each submitted transaction to be included.
    pub confirmation_rounds: u64,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for idempotent reads.
    pub retries: RetryConfig,

    /// Bridge request monitor settings.
    pub watch: WatchConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            collection_network: None,
            accounts: AccountsConfig::default(),
            confirmation_rounds: 4,
            timeouts: TimeoutConfig::default(),
            retries: RetryConfig::default(),
            watch: WatchConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// The network clones are read from, defaulting to the operator network.
    pub fn collection_network(&self) -> &NetworkConfig {
        self.collection_network.as_ref().unwrap_or(&self.network)
    }
}

/// Network selection plus per-service overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Symbolic network name, optionally with a `:suffix` that is ignored.
    pub name: String,

    /// Submission service (algod) overrides.
    pub algod: ServiceConfig,

    /// Query service (indexer) overrides.
    pub indexer: ServiceConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: Network::default().as_str().to_string(),
            algod: ServiceConfig::default(),
            indexer: ServiceConfig::default(),
        }
    }
}

impl NetworkConfig {
    /// The bare network name, without any `:suffix`.
    pub fn network_name(&self) -> &str {
        self.name.split(':').next().unwrap_or_default()
    }

    /// Explicit endpoint values that take precedence over the network table.
    pub fn overrides(&self) -> EndpointOverrides {
        EndpointOverrides {
            algod_server: self.algod.server.clone(),
            algod_port: self.algod.port.clone(),
            algod_token: self.algod.token.clone(),
            indexer_server: self.indexer.server.clone(),
            indexer_port: self.indexer.port.clone(),
            indexer_token: self.indexer.token.clone(),
        }
    }
}

/// Explicit service endpoint values. Empty strings count as unset.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL replacing the table value.
    pub server: Option<String>,

    /// Port applied to the base URL.
    pub port: Option<String>,

    /// API token sent with every request.
    pub token: Option<String>,
}

/// Addresses the workflows send to.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Destination address on the other side of the bridge (`ADDR`).
    pub destination: Option<String>,

    /// Bridge service address (`BRIDGE_ADDR`).
    pub bridge: Option<String>,
}

/// Timeout configuration for service calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts for a read, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 4000,
        }
    }
}

/// Bridge request monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Poll interval in seconds.
    pub interval_secs: u64,

    /// Minimum payment in microAlgos for a request to be accepted.
    pub min_payment: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            min_payment: 200_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// `pretty` or `json`.
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "nft_bridge=info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.network.name, "algorand-testnet");
        assert_eq!(config.confirmation_rounds, 4);
        assert_eq!(config.watch.min_payment, 200_000);
        assert!(config.collection_network.is_none());
    }

    #[test]
    fn test_network_name_strips_suffix() {
        let network = NetworkConfig {
            name: "voi-testnet:4001".to_string(),
            ..Default::default()
        };
        assert_eq!(network.network_name(), "voi-testnet");
    }

    #[test]
    fn test_collection_network_falls_back() {
        let mut config = BridgeConfig::default();
        config.network.name = "algorand".to_string();
        assert_eq!(config.collection_network().name, "algorand");

        config.collection_network = Some(NetworkConfig {
            name: "voi-testnet".to_string(),
            ..Default::default()
        });
        assert_eq!(config.collection_network().name, "voi-testnet");
    }

    #[test]
    fn test_partial_toml() {
        let config: BridgeConfig = toml::from_str(
            r#"
            confirmation_rounds = 10

            [network]
            name = "algorand"

            [network.algod]
            token = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.confirmation_rounds, 10);
        assert_eq!(config.network.name, "algorand");
        assert_eq!(config.network.algod.token.as_deref(), Some("secret"));
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
