//! Shared utilities for gateway integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use vinyl_gateway::observability::{EventSink, GatewayEvent};
use vinyl_gateway::{GatewayConfig, GatewayServer, Shutdown};

/// Chunk size and count served by the `/stream` mock path.
pub const STREAM_CHUNK: usize = 16 * 1024;
pub const STREAM_CHUNKS: usize = 64;

/// One request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
struct BackendState {
    name: &'static str,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// A mock upstream service that records what it receives.
///
/// Path suffixes change its behaviour:
/// - `/stream`: streamed body of `STREAM_CHUNKS * STREAM_CHUNK` bytes
/// - `/slow`: answers after 300ms
/// - `/stall`: answers after 5s
/// - `/cors`: sets its own permissive `Access-Control-Allow-Origin: *`
/// - `/missing`: upstream 404 with its own JSON body
/// - anything else: 200 JSON echo of service name, path and query
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Recorded {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("backend received no request")
    }
}

/// Start a mock backend on an ephemeral port.
pub async fn start_mock_backend(name: &'static str) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = BackendState {
        name,
        hits: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let backend = MockBackend {
        addr,
        hits: state.hits.clone(),
        requests: state.requests.clone(),
    };

    let app = Router::new().fallback(mock_handler).with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    backend
}

async fn mock_handler(State(state): State<BackendState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path().to_string();

    state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(Recorded {
        method: parts.method.clone(),
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        headers: parts.headers.clone(),
        body: body.clone(),
    });

    if path.ends_with("/stream") {
        let chunks = futures_util::stream::iter(
            (0..STREAM_CHUNKS).map(|_| Ok::<_, std::io::Error>(Bytes::from(vec![b'x'; STREAM_CHUNK]))),
        );
        return Response::new(Body::from_stream(chunks));
    }
    if path.ends_with("/slow") {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    if path.ends_with("/stall") {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    if path.ends_with("/cors") {
        return (
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(json!({ "service": state.name })),
        )
            .into_response();
    }
    if path.ends_with("/missing") {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "no such album" }))).into_response();
    }

    Json(json!({
        "service": state.name,
        "method": parts.method.as_str(),
        "path": path,
        "query": parts.uri.query(),
        "body_len": body.len(),
    }))
    .into_response()
}

/// Send one raw HTTP/1.1 request line and return the response head.
///
/// Bypasses client-side URL normalisation so dot segments reach the gateway.
pub async fn send_raw(addr: SocketAddr, method: &str, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let text = String::from_utf8_lossy(&response).into_owned();
    match text.split_once("\r\n\r\n") {
        Some((head, _)) => head.to_string(),
        None => text,
    }
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Event sink that keeps everything for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GatewayEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<GatewayEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: GatewayEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Four backends, one per service.
pub struct Backends {
    pub user: MockBackend,
    pub catalog: MockBackend,
    pub rating: MockBackend,
    pub playlist: MockBackend,
}

impl Backends {
    pub async fn start() -> Self {
        Self {
            user: start_mock_backend("user").await,
            catalog: start_mock_backend("catalog").await,
            rating: start_mock_backend("rating").await,
            playlist: start_mock_backend("playlist").await,
        }
    }

    pub fn total_hits(&self) -> usize {
        self.user.hits() + self.catalog.hits() + self.rating.hits() + self.playlist.hits()
    }

    pub fn config(&self) -> GatewayConfig {
        let mut config = test_config();
        config.services.user = self.user.url();
        config.services.catalog = self.catalog.url();
        config.services.rating = self.rating.url();
        config.services.playlist = self.playlist.url();
        config
    }
}

/// Defaults with short timeouts.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.timeouts.connect_secs = 1;
    config.timeouts.request_secs = 2;
    config.timeouts.drain_secs = 5;
    config
}

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub events: Arc<RecordingSink>,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let events = Arc::new(RecordingSink::default());
    let server = GatewayServer::with_event_sink(config, events.clone()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestGateway {
        addr,
        shutdown,
        events,
        handle,
    }
}
