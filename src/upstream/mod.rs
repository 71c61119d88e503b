//! Upstream service subsystem.
//!
//! # Data Flow
//! ```text
//! ServicesConfig (one base URL per service)
//!     → endpoint.rs (parse, validate, pre-split scheme/authority/path)
//!     → registry.rs (ServiceId → endpoint + connection slots)
//!     → forwarder asks for an endpoint and a slot per request
//! ```
//!
//! # Design Decisions
//! - Resolved once at startup; an unusable address refuses startup
//! - One endpoint per service, no load balancing
//! - Slot permits bound concurrent exchanges per service

pub mod endpoint;
pub mod registry;

pub use endpoint::ServiceEndpoint;
pub use registry::{Upstream, UpstreamPermit, UpstreamRegistry};
