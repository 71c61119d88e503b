//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → origin.rs (CORS headers, preflight short-circuit)
//!     → [routing decides service and access]
//!     → credential.rs (bearer shape check, protected routes only)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → Pass to forwarder
//! ```
//!
//! # Design Decisions
//! - Fail closed: a protected route without a well-formed credential is rejected
//! - Token authenticity belongs to the backends, not the gateway
//! - Policies are immutable after startup and shared without locks

pub mod credential;
pub mod headers;
pub mod origin;

pub use credential::{Credential, CredentialGate};
pub use origin::{CorsDecision, OriginPolicy};
