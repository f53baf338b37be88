//! Symbolic network names and their public service gateways.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Networks with a known public gateway pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Algorand testnet, also the fallback for unknown names.
    #[default]
    AlgorandTestnet,
    /// Algorand mainnet.
    Algorand,
    /// Voi testnet.
    VoiTestnet,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::AlgorandTestnet, Network::Algorand, Network::VoiTestnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::AlgorandTestnet => "algorand-testnet",
            Network::Algorand => "algorand",
            Network::VoiTestnet => "voi-testnet",
        }
    }

    /// Submission (algod) and query (indexer) base URLs.
    pub fn gateways(&self) -> (&'static str, &'static str) {
        match self {
            Network::VoiTestnet => (
                "https://testnet-api.voi.nodly.io",
                "https://testnet-idx.voi.nodly.io",
            ),
            Network::AlgorandTestnet => (
                "https://testnet-api.algonode.cloud",
                "https://testnet-idx.algonode.cloud",
            ),
            Network::Algorand => (
                "https://mainnet-api.algonode.cloud",
                "https://mainnet-idx.algonode.cloud",
            ),
        }
    }

    /// Lenient lookup: unknown names map to the default network.
    pub fn from_name_or_default(name: &str) -> Self {
        match name.parse() {
            Ok(network) => network,
            Err(InvalidNetwork(name)) => {
                tracing::warn!(
                    network = %name,
                    fallback = Network::default().as_str(),
                    "Unknown network name, using default gateways"
                );
                Network::default()
            }
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network name outside the known table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network '{0}' (expected algorand-testnet, algorand or voi-testnet)")]
pub struct InvalidNetwork(pub String);

impl FromStr for Network {
    type Err = InvalidNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| InvalidNetwork(s.to_string()))
    }
}

/// Explicit endpoint values; each one wins over the table when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointOverrides {
    pub algod_server: Option<String>,
    pub algod_port: Option<String>,
    pub algod_token: Option<String>,
    pub indexer_server: Option<String>,
    pub indexer_port: Option<String>,
    pub indexer_token: Option<String>,
}

/// Errors turning a resolved endpoint into a usable URL.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid service URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid service port '{0}'")]
    Port(String),
}

/// One service endpoint: base URL, optional port, API token.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub server: String,
    pub port: Option<String>,
    pub token: String,
}

impl ServiceEndpoint {
    /// The base URL with the port applied.
    pub fn url(&self) -> Result<Url, EndpointError> {
        let mut url = Url::parse(&self.server).map_err(|source| EndpointError::Url {
            url: self.server.clone(),
            source,
        })?;
        if let Some(port) = &self.port {
            let port: u16 = port.parse().map_err(|_| EndpointError::Port(port.clone()))?;
            url.set_port(Some(port))
                .map_err(|_| EndpointError::Port(port.to_string()))?;
        }
        Ok(url)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEndpoint")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Submission and query service endpoints of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub network: Network,
    pub algod: ServiceEndpoint,
    pub indexer: ServiceEndpoint,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

/// Resolve a symbolic network name to its service endpoints.
///
/// Never fails: an unknown name resolves to the default network's gateways.
/// Non-empty overrides take precedence over the table values.
pub fn resolve_endpoints(name: &str, overrides: &EndpointOverrides) -> Endpoints {
    let network = Network::from_name_or_default(name);
    let (algod_url, indexer_url) = network.gateways();

    Endpoints {
        network,
        algod: ServiceEndpoint {
            server: non_empty(&overrides.algod_server).unwrap_or_else(|| algod_url.to_string()),
            port: non_empty(&overrides.algod_port),
            token: non_empty(&overrides.algod_token).unwrap_or_default(),
        },
        indexer: ServiceEndpoint {
            server: non_empty(&overrides.indexer_server)
                .unwrap_or_else(|| indexer_url.to_string()),
            port: non_empty(&overrides.indexer_port),
            token: non_empty(&overrides.indexer_token).unwrap_or_default(),
        },
    }
}
