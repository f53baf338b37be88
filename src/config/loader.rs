//! Configuration loading from disk and the environment.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, then
//! command-line / environment overrides. Validation runs on the merged result.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{BridgeConfig, NetworkConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line or through the environment.
///
/// Empty strings count as unset, so an exported-but-empty variable does not
/// clobber the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub node: Option<String>,
    pub collection_node: Option<String>,
    pub destination: Option<String>,
    pub bridge: Option<String>,
    pub algod_server: Option<String>,
    pub algod_port: Option<String>,
    pub algod_token: Option<String>,
    pub indexer_server: Option<String>,
    pub indexer_port: Option<String>,
    pub indexer_token: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

fn set(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
        *target = Some(v.clone());
    }
}

impl ConfigOverrides {
    /// Merge into `config`. Service overrides apply to the operator network.
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(node) = self.node.as_ref().filter(|v| !v.is_empty()) {
            config.network.name = node.clone();
        }
        if let Some(node) = self.collection_node.as_ref().filter(|v| !v.is_empty()) {
            match config.collection_network.as_mut() {
                Some(collection) => collection.name = node.clone(),
                None => {
                    config.collection_network = Some(NetworkConfig {
                        name: node.clone(),
                        ..Default::default()
                    })
                }
            }
        }

        set(&mut config.accounts.destination, &self.destination);
        set(&mut config.accounts.bridge, &self.bridge);

        set(&mut config.network.algod.server, &self.algod_server);
        set(&mut config.network.algod.port, &self.algod_port);
        set(&mut config.network.algod.token, &self.algod_token);
        set(&mut config.network.indexer.server, &self.indexer_server);
        set(&mut config.network.indexer.port, &self.indexer_port);
        set(&mut config.network.indexer.token, &self.indexer_token);

        if let Some(level) = self.log_level.as_ref().filter(|v| !v.is_empty()) {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = self.log_format.as_ref().filter(|v| !v.is_empty()) {
            config.observability.log_format = format.clone();
        }
    }
}

/// Parse a TOML file without validating it.
pub fn read_config_file(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: defaults or `path`, then `overrides`,
/// then validation.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<BridgeConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => BridgeConfig::default(),
    };
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
