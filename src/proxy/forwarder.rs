//! Request forwarding to a resolved upstream.
//!
//! # Responsibilities
//! - Take a per-service slot before touching the network
//! - Rewrite scheme/authority/path onto the endpoint, keep the query
//! - Forward method, headers (Authorization untouched) and body as a stream
//! - Stream the upstream response back without buffering it
//! - Classify every transport failure as an `UpstreamError`
//!
//! # Design Decisions
//! - Pooled hyper client: a connection is either idle in the pool or owned by
//!   exactly one exchange
//! - Dropping the response body (client gone, deadline hit) drops the upstream
//!   connection with it, so a half-read connection never returns to the pool
//! - Only the time to response headers is bounded; bodies may stream longer

use std::net::IpAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Version},
    response::Response,
};
use hyper::body::{Bytes, Frame, Incoming, SizeHint};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::{TokioExecutor, TokioTimer},
};

use crate::config::schema::{PoolConfig, TimeoutConfig};
use crate::error::UpstreamError;
use crate::routing::ServiceId;
use crate::security::headers::{apply_forwarded, strip_hop_by_hop};
use crate::upstream::{Upstream, UpstreamPermit};

/// Pooled HTTP/1.1 client shared by every request.
pub type HttpClient = Client<HttpConnector, Body>;

/// Proxies matched requests to their upstream.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: HttpClient,
    /// Deadline for upstream response headers.
    request_timeout: Duration,
    /// How long to wait for a free per-service slot.
    acquire_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig, pool: &PoolConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs))
            .pool_max_idle_per_host(pool.max_idle_per_service)
            .build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
            acquire_timeout: Duration::from_secs(timeouts.connect_secs),
        }
    }

    /// Forward `request` to `upstream` and relay its response.
    pub async fn forward(
        &self,
        upstream: &Upstream,
        request: Request<Body>,
        peer: Option<IpAddr>,
    ) -> Result<Response, UpstreamError> {
        let service = upstream.endpoint.id;
        let permit = upstream.acquire(self.acquire_timeout).await?;

        let (mut parts, body) = request.into_parts();
        parts.uri = upstream
            .endpoint
            .target_uri(&parts.uri)
            .map_err(|e| protocol_error(service, e))?;
        // Backends speak HTTP/1.1 regardless of the inbound protocol.
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);
        apply_forwarded(&mut parts.headers, peer);

        tracing::trace!(service = %service, uri = %parts.uri, "Forwarding upstream");

        let outbound = Request::from_parts(parts, body);
        let response = match tokio::time::timeout(self.request_timeout, self.client.request(outbound)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(classify(service, &e)),
            Err(_) => {
                return Err(UpstreamError::Timeout {
                    service: service.to_string(),
                    timeout_secs: self.request_timeout.as_secs(),
                })
            }
        };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);

        let body = Body::new(RelayBody {
            inner: body,
            permit,
        });
        Ok(Response::from_parts(parts, body))
    }
}

fn classify(service: ServiceId, error: &hyper_util::client::legacy::Error) -> UpstreamError {
    if error.is_connect() {
        UpstreamError::ConnectFailed {
            service: service.to_string(),
            message: error_chain(error),
        }
    } else {
        UpstreamError::ProtocolError {
            service: service.to_string(),
            message: error_chain(error),
        }
    }
}

fn protocol_error(service: ServiceId, error: impl std::fmt::Display) -> UpstreamError {
    UpstreamError::ProtocolError {
        service: service.to_string(),
        message: error.to_string(),
    }
}

/// Render an error and its sources on one line for logs.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Upstream body that keeps the service slot until it is finished or dropped.
struct RelayBody {
    inner: Incoming,
    permit: UpstreamPermit,
}

impl hyper::body::Body for RelayBody {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let polled = Pin::new(&mut self.inner).poll_frame(cx);
        if let Poll::Ready(Some(Err(e))) = &polled {
            tracing::warn!(service = %self.permit.service(), error = %e, "Upstream body aborted mid-stream");
        }
        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
