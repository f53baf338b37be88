//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → raises a flag; every ShutdownSignal (the request monitor)
//!     returns, including ones subscribed after the trigger
//! ```
//!
//! Only long-running commands (`watch`) listen for shutdown; one-shot
//! workflows run to completion or fail.

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::{shutdown_on_signal, wait_for_signal};
