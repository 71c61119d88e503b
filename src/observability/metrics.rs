//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by service, method, status
//! - `gateway_request_duration_seconds` (histogram): upstream latency
//! - `gateway_upstream_errors_total` (counter): failures by service and kind
//! - `gateway_preflight_total` (counter): answered CORS preflights
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::events::{EventSink, GatewayEvent};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Event sink that turns gateway events into metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSink;

impl EventSink for MetricsSink {
    fn record(&self, event: GatewayEvent) {
        match event {
            GatewayEvent::Preflight => {
                metrics::counter!("gateway_preflight_total").increment(1);
            }
            GatewayEvent::Rejected { method, status, reason } => {
                metrics::counter!(
                    "gateway_requests_total",
                    "service" => "none",
                    "method" => method.to_string(),
                    "status" => status.as_u16().to_string(),
                    "reason" => reason
                )
                .increment(1);
            }
            GatewayEvent::Forwarded { service, method, status, elapsed } => {
                metrics::counter!(
                    "gateway_requests_total",
                    "service" => service.as_str(),
                    "method" => method.to_string(),
                    "status" => status.as_u16().to_string()
                )
                .increment(1);
                metrics::histogram!(
                    "gateway_request_duration_seconds",
                    "service" => service.as_str()
                )
                .record(elapsed.as_secs_f64());
            }
            GatewayEvent::UpstreamFailed { service, method, kind, elapsed } => {
                metrics::counter!(
                    "gateway_requests_total",
                    "service" => service.as_str(),
                    "method" => method.to_string(),
                    "status" => "502"
                )
                .increment(1);
                metrics::counter!(
                    "gateway_upstream_errors_total",
                    "service" => service.as_str(),
                    "kind" => kind
                )
                .increment(1);
                metrics::histogram!(
                    "gateway_request_duration_seconds",
                    "service" => service.as_str()
                )
                .record(elapsed.as_secs_f64());
            }
        }
    }
}
