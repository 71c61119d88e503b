//! Upstream forwarding.
//!
//! # Data Flow
//! ```text
//! validated request
//!     → forwarder.rs (slot, URI rewrite, header rewrite)
//!     → pooled hyper client → backend
//!     → streamed response (slot released when the body ends or is dropped)
//! ```

pub mod forwarder;

pub use forwarder::Forwarder;
