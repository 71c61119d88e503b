//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / forwarder produce:
//!     → tracing macros (structured log events, request spans)
//!     → events.rs (GatewayEvent into an injected EventSink)
//!
//! Sinks:
//!     → metrics.rs (MetricsSink → metrics facade → Prometheus scrape)
//!     → tests (recording sinks)
//! ```
//!
//! # Design Decisions
//! - No process-global counters; the sink is injected into server state
//! - Request ID flows through logs, the response and the upstream request
//! - Metrics are cheap (atomic increments) and a no-op without a recorder

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EventSink, GatewayEvent, NoopSink};
pub use metrics::MetricsSink;
