//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → ConfigOverrides (command line / environment)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow running without a file
//! - Validation separates syntactic (serde) from semantic checks
//! - Mnemonics never pass through here

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, ConfigOverrides};
pub use schema::BridgeConfig;
pub use schema::NetworkConfig;
pub use validation::ValidationError;
