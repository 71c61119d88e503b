//! Vinyl edge gateway library.
//!
//! Single entry point in front of the user, catalog, rating and playlist
//! services: applies the cross-origin policy, routes by method and path
//! prefix, checks bearer credential shape on protected routes and streams
//! the exchange to the chosen upstream.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
