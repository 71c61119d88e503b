//! Gateway events and the sink they are reported to.

use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::routing::ServiceId;

/// Something observable happened while handling a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// An `OPTIONS` request answered by the origin policy.
    Preflight,

    /// The gateway answered on its own (404 / 401).
    Rejected {
        method: Method,
        status: StatusCode,
        reason: &'static str,
    },

    /// The upstream responded; `status` is whatever it returned.
    Forwarded {
        service: ServiceId,
        method: Method,
        status: StatusCode,
        elapsed: Duration,
    },

    /// The upstream could not be reached or broke; client got a 502.
    UpstreamFailed {
        service: ServiceId,
        method: Method,
        kind: &'static str,
        elapsed: Duration,
    },
}

/// Receiver for gateway events. Implementations must be cheap and non-blocking.
pub trait EventSink: Send + Sync + 'static {
    fn record(&self, event: GatewayEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _event: GatewayEvent) {}
}
