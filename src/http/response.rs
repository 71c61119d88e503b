//! Client-facing error responses.
//!
//! Every gateway-generated failure is `application/json` with a single
//! `error` field carrying a stable, category-specific message.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{GatewayError, RoutingError};

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Routing(RoutingError::NoMatch) => StatusCode::NOT_FOUND,
            GatewayError::Routing(RoutingError::NotCanonical { .. }) => StatusCode::MOVED_PERMANENTLY,
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Routing(RoutingError::NotCanonical { location }) = &self {
            if let Ok(location) = HeaderValue::from_str(location) {
                return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
            }
        }
        (self.status(), Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Body of the health endpoint.
pub async fn health() -> &'static str {
    "OK"
}
