//! Request-path error taxonomy.
//!
//! Every failure a request can hit between the listener and the upstream is
//! one of these. Startup failures live in [`crate::config::ConfigError`].
//!
//! The `Display` text of [`RoutingError`] and [`AuthError`] is the stable,
//! client-facing message. [`UpstreamError`] text is for logs only; clients
//! always see [`UPSTREAM_UNAVAILABLE`].

use thiserror::Error;

/// Body message for every upstream failure.
pub const UPSTREAM_UNAVAILABLE: &str = "Service temporarily unavailable";

/// Route resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No rule matched the (method, path) pair.
    #[error("Not found")]
    NoMatch,

    /// Path has dot segments or empty segments. `location` is the clean
    /// path plus the original query.
    #[error("Moved permanently")]
    NotCanonical { location: String },
}

impl RoutingError {
    /// Short machine label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingError::NoMatch => "no_route",
            RoutingError::NotCanonical { .. } => "non_canonical_path",
        }
    }
}

/// Credential shape failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authorization header absent or empty.
    #[error("Missing authorization header")]
    Missing,

    /// Header present but not using the `Bearer ` scheme.
    #[error("Invalid authorization format. Expected: Bearer <token>")]
    MalformedScheme,

    /// `Bearer ` with nothing after it.
    #[error("Missing token")]
    EmptyToken,
}

impl AuthError {
    /// Short machine label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Missing => "missing",
            AuthError::MalformedScheme => "malformed_scheme",
            AuthError::EmptyToken => "empty_token",
        }
    }
}

/// Failure talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// TCP connect or DNS resolution failed.
    #[error("connect to {service} failed: {message}")]
    ConnectFailed { service: String, message: String },

    /// No response headers before the deadline.
    #[error("{service} did not respond within {timeout_secs}s")]
    Timeout { service: String, timeout_secs: u64 },

    /// Connection established but the exchange broke.
    #[error("protocol error talking to {service}: {message}")]
    ProtocolError { service: String, message: String },

    /// All connection slots for the service are in use.
    #[error("{service} connection limit reached")]
    Saturated { service: String },
}

impl UpstreamError {
    /// Short machine label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::ConnectFailed { .. } => "connect_failed",
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::ProtocolError { .. } => "protocol_error",
            UpstreamError::Saturated { .. } => "saturated",
        }
    }
}

/// Any request-path failure.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    /// The message placed in the `error` field of the response body.
    pub fn client_message(&self) -> String {
        match self {
            GatewayError::Routing(e) => e.to_string(),
            GatewayError::Auth(e) => e.to_string(),
            GatewayError::Upstream(_) => UPSTREAM_UNAVAILABLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_messages_are_distinct() {
        let msgs = [
            AuthError::Missing.to_string(),
            AuthError::MalformedScheme.to_string(),
            AuthError::EmptyToken.to_string(),
        ];
        assert_ne!(msgs[0], msgs[1]);
        assert_ne!(msgs[1], msgs[2]);
        assert_ne!(msgs[0], msgs[2]);
    }

    #[test]
    fn upstream_detail_never_reaches_client() {
        let err = GatewayError::from(UpstreamError::ConnectFailed {
            service: "catalog".into(),
            message: "dns error: catalog.internal.svc".into(),
        });
        assert_eq!(err.client_message(), UPSTREAM_UNAVAILABLE);
        assert!(err.to_string().contains("catalog.internal.svc"));
    }
}
