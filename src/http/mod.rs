//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful drain)
//!     → request.rs (request ID)
//!     → /health answered directly, everything else:
//!     → dispatcher.rs (origin → route → credential → forward)
//!     → response.rs (structured error bodies)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::GatewayState;
pub use request::{request_id, X_REQUEST_ID};
pub use server::GatewayServer;
