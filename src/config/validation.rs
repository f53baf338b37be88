//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Network names must be known; addresses must decode
//! - Validate value ranges (rounds, timeouts, attempts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before any client is built

use std::fmt;

use url::Url;

use crate::config::schema::{BridgeConfig, NetworkConfig, ServiceConfig};
use crate::ledger::Address;
use crate::network::Network;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every semantic rule and report all violations.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_network("network", &config.network, &mut errors);
    if let Some(collection) = &config.collection_network {
        validate_network("collection_network", collection, &mut errors);
    }

    validate_address("accounts.destination", config.accounts.destination.as_deref(), &mut errors);
    validate_address("accounts.bridge", config.accounts.bridge.as_deref(), &mut errors);

    if config.confirmation_rounds == 0 {
        errors.push(ValidationError::new("confirmation_rounds", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be greater than 0"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }
    if config.watch.interval_secs == 0 {
        errors.push(ValidationError::new("watch.interval_secs", "must be greater than 0"));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}' (expected pretty or json)", other),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_network(field: &str, network: &NetworkConfig, errors: &mut Vec<ValidationError>) {
    if let Err(e) = network.network_name().parse::<Network>() {
        errors.push(ValidationError::new(format!("{}.name", field), e.to_string()));
    }
    validate_service(&format!("{}.algod", field), &network.algod, errors);
    validate_service(&format!("{}.indexer", field), &network.indexer, errors);
}

fn validate_service(field: &str, service: &ServiceConfig, errors: &mut Vec<ValidationError>) {
    if let Some(server) = service.server.as_deref().filter(|s| !s.is_empty()) {
        if let Err(e) = Url::parse(server) {
            errors.push(ValidationError::new(
                format!("{}.server", field),
                format!("invalid URL '{}': {}", server, e),
            ));
        }
    }
    if let Some(port) = service.port.as_deref().filter(|p| !p.is_empty()) {
        if port.parse::<u16>().is_err() {
            errors.push(ValidationError::new(
                format!("{}.port", field),
                format!("invalid port '{}'", port),
            ));
        }
    }
}

fn validate_address(field: &str, value: Option<&str>, errors: &mut Vec<ValidationError>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        if value.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                field,
                format!("'{}' is not a valid address", value),
            ));
        }
    }
}
