//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (serde)
//!     → config file (TOML, optional)
//!     → loader.rs (.env + environment overrides)
//!     → validation.rs (semantic checks, all errors at once)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into RouteTable / OriginPolicy / UpstreamRegistry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A bad upstream address refuses startup instead of failing per request

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, PoolConfig, RouteConfig,
    ServicesConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
