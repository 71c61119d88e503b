//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile config into the routing, policy and upstream subsystems
//! - Create Axum Router with the health route and the dispatcher
//! - Wire up middleware (request ID, tracing, concurrency limit)
//! - Serve until shutdown, then drain for a bounded grace period

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::validation::{compile_routes, validate_config};
use crate::config::{ConfigError, GatewayConfig};
use crate::http::dispatcher::{dispatch, GatewayState};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::health;
use crate::observability::{EventSink, MetricsSink};
use crate::proxy::Forwarder;
use crate::security::{CredentialGate, OriginPolicy};
use crate::upstream::UpstreamRegistry;

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server reporting events to the metrics facade.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        Self::with_event_sink(config, Arc::new(MetricsSink))
    }

    /// Create a server with an injected event sink.
    pub fn with_event_sink(config: GatewayConfig, events: Arc<dyn EventSink>) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let routes = compile_routes(&config.routes)?;
        let origin_policy = OriginPolicy::from_config(&config.cors)?;
        let upstreams = UpstreamRegistry::from_config(&config.services, &config.pool)?;
        let forwarder = Forwarder::new(&config.timeouts, &config.pool);

        for endpoint in upstreams.endpoints() {
            tracing::info!(service = %endpoint.id, url = %endpoint.base_url, "Upstream registered");
        }
        tracing::info!(
            routes = routes.len(),
            allowed_origins = config.cors.allowed_origins.len(),
            "Routing table compiled, authentication enforced on protected routes"
        );

        let state = GatewayState {
            routes: Arc::new(routes),
            origin_policy: Arc::new(origin_policy),
            credentials: CredentialGate,
            upstreams: Arc::new(upstreams),
            forwarder: Arc::new(forwarder),
            events,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: GatewayState) -> Router {
        Router::new()
            .route("/health", any(health))
            .fallback(dispatch)
            .with_state(state)
            // One semaphore shared by every route.
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    ///
    /// After the signal no new connections are accepted. In-flight requests
    /// get `timeouts.drain_secs` to finish; whatever is left is abandoned and
    /// closed when the runtime shuts down.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let drain = Duration::from_secs(self.config.timeouts.drain_secs);
        let (drain_tx, drain_rx) = oneshot::channel::<()>();

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                // A dropped sender counts as a shutdown request too.
                let _ = shutdown.recv().await;
                tracing::info!(drain_secs = drain.as_secs(), "Shutdown signal received, draining");
                let _ = drain_tx.send(());
            })
            .into_future();

        let deadline = async move {
            match drain_rx.await {
                Ok(()) => tokio::time::sleep(drain).await,
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = server => result?,
            _ = deadline => {
                tracing::warn!(drain_secs = drain.as_secs(), "Drain timeout elapsed, closing remaining connections");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::NoopSink;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    fn server() -> GatewayServer {
        GatewayServer::with_event_sink(GatewayConfig::default(), Arc::new(NoopSink)).unwrap()
    }

    async fn send(request: Request<Body>) -> axum::response::Response {
        server().router().oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn health_answers_any_method() {
        for method in [Method::GET, Method::POST, Method::OPTIONS, Method::DELETE] {
            let response = send(
                Request::builder()
                    .method(method.clone())
                    .uri("/health")
                    .header(header::AUTHORIZATION, "Basic nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK, "{method}");
            assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).is_none());
            let body = to_bytes(response.into_body(), 16).await.unwrap();
            assert_eq!(&body[..], b"OK");
        }
    }

    #[tokio::test]
    async fn preflight_skips_routing_and_auth() {
        for path in ["/api/v1/playlists/3", "/does/not/exist"] {
            let response = send(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(path)
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                "http://localhost:3000"
            );
            assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "86400");
            let body = to_bytes(response.into_body(), 16).await.unwrap();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn unmatched_path_is_404_with_cors() {
        let response = send(
            Request::builder()
                .uri("/api/v2/albums")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert!(response.headers().get("x-request-id").is_some());
    }

    #[tokio::test]
    async fn protected_route_without_credential_is_401() {
        let response = send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/albums")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), 256).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Missing authorization header");
    }

    #[tokio::test]
    async fn bearer_without_token_is_401() {
        let response = send(
            Request::builder()
                .uri("/api/v1/me")
                .header(header::AUTHORIZATION, "Bearer ")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), 256).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Missing token");
    }

    #[test]
    fn invalid_config_refuses_to_build() {
        let mut config = GatewayConfig::default();
        config.services.user = "user-service".into();
        assert!(matches!(
            GatewayServer::new(config),
            Err(ConfigError::Validation(_))
        ));
    }
}
