//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown_signal() resolves
//!
//! Shutdown (shutdown.rs):
//!     trigger() → server stops accepting → in-flight drain (bounded) → exit
//! ```
//!
//! # Design Decisions
//! - Startup is strictly ordered in main: config, logging, metrics, bind, serve
//! - Any startup error is fatal; the process never serves a partial config
//! - Drain has a deadline; remaining connections are closed after it

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
