//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Read from algod / indexer:
//!     → per-request timeout (ledger::service)
//!     → On transient failure: retries.rs (retry with backoff.rs delays)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Only idempotent reads are retried; broadcasts never are
//! - Retries are bounded by `retries.max_attempts`

pub mod backoff;
pub mod retries;

pub use retries::retry_idempotent;
