//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs subscriber (stderr, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured fields (tx_id, round, asset_id) rather than formatted text
//! - Secrets (mnemonics, tokens) are never logged

pub mod logging;

pub use logging::{init_logging, LogFormat};
