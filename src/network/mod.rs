//! Network endpoint selection.
//!
//! # Data Flow
//! ```text
//! NODE / COLL_NODE (symbolic name)
//!     → endpoints.rs (table lookup, fallback to default)
//!     → ALGOD_* / INDEXER_* overrides applied
//!     → Endpoints (submission + query service)
//! ```

pub mod endpoints;

pub use endpoints::{
    resolve_endpoints, EndpointError, EndpointOverrides, Endpoints, InvalidNetwork, Network,
    ServiceEndpoint,
};
