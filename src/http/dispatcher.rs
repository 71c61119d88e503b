//! Per-request pipeline.
//!
//! ```text
//! Start → OriginChecked ─┬─ OPTIONS ──────────────→ 200 (preflight)
//!                        ├─ unclean path ─────────→ 301 to the clean path
//!                        └→ Routed ─┬─ no rule ───→ 404
//!                                   ├─ public ────→ Forwarded
//!                                   └─ protected → AuthChecked ─┬─ bad shape → 401
//!                                                               └→ Forwarded
//! Forwarded → upstream response relayed | transport failure → 502
//! ```
//!
//! CORS headers from the origin check are written onto every outcome.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request},
    response::{IntoResponse, Response},
};

use crate::error::{GatewayError, RoutingError, UpstreamError};
use crate::http::request::request_id;
use crate::observability::{EventSink, GatewayEvent};
use crate::proxy::Forwarder;
use crate::routing::{clean_path, RouteTable};
use crate::security::{CredentialGate, OriginPolicy};
use crate::upstream::UpstreamRegistry;

/// Shared, read-only state injected into the dispatcher.
#[derive(Clone)]
pub struct GatewayState {
    pub routes: Arc<RouteTable>,
    pub origin_policy: Arc<OriginPolicy>,
    pub credentials: CredentialGate,
    pub upstreams: Arc<UpstreamRegistry>,
    pub forwarder: Arc<Forwarder>,
    pub events: Arc<dyn EventSink>,
}

/// Fallback handler for everything except `/health`.
pub async fn dispatch(State(state): State<GatewayState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let origin = request.headers().get(header::ORIGIN);
    let cors = state.origin_policy.apply(origin, &method);

    if cors.short_circuit {
        state.events.record(GatewayEvent::Preflight);
        return cors.preflight_response();
    }

    let request_id = request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();

    let mut response = match route_and_forward(&state, request).await {
        Ok(response) => response,
        Err(err) => {
            let reason = match &err {
                GatewayError::Upstream(e) => {
                    tracing::error!(request_id = %request_id, method = %method, path = %path, error = %e, "Upstream error");
                    None
                }
                GatewayError::Routing(e) => Some(e.kind()),
                GatewayError::Auth(e) => Some(e.kind()),
            };
            if let Some(reason) = reason {
                tracing::debug!(request_id = %request_id, method = %method, path = %path, reason, "Request rejected");
                state.events.record(GatewayEvent::Rejected {
                    method: method.clone(),
                    status: err.status(),
                    reason,
                });
            }
            err.into_response()
        }
    };

    cors.write_to(response.headers_mut());
    response
}

async fn route_and_forward(state: &GatewayState, mut request: Request<Body>) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    if let Cow::Owned(clean) = clean_path(request.uri().path()) {
        let location = match request.uri().query() {
            Some(query) => format!("{clean}?{query}"),
            None => clean,
        };
        return Err(RoutingError::NotCanonical { location }.into());
    }
    let route = state.routes.resolve(&method, request.uri().path())?;
    let service = route.service;

    if route.requires_auth() {
        let credential = state
            .credentials
            .check(request.headers().get(header::AUTHORIZATION))?;
        // Authorization header stays on the request untouched.
        request.extensions_mut().insert(credential);
    }

    tracing::debug!(
        request_id = %request_id(request.headers()),
        method = %method,
        path = %request.uri().path(),
        route = %route.rule.name,
        service = %service,
        "Proxying request"
    );

    let upstream = state
        .upstreams
        .get(service)
        .ok_or_else(|| UpstreamError::ConnectFailed {
            service: service.to_string(),
            message: "service not registered".to_string(),
        })?;

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let start = Instant::now();
    match state.forwarder.forward(&upstream, request, peer).await {
        Ok(response) => {
            state.events.record(GatewayEvent::Forwarded {
                service,
                method,
                status: response.status(),
                elapsed: start.elapsed(),
            });
            Ok(response)
        }
        Err(e) => {
            state.events.record(GatewayEvent::UpstreamFailed {
                service,
                method,
                kind: e.kind(),
                elapsed: start.elapsed(),
            });
            Err(e.into())
        }
    }
}
