//! Cross-origin access policy.
//!
//! # Responsibilities
//! - Echo `Access-Control-Allow-Origin` for exact allow-list matches
//! - Always emit the static method/header/credential/max-age headers
//! - Short-circuit `OPTIONS` preflights before routing and auth
//!
//! # Design Decisions
//! - A disallowed origin only loses the allow-origin header; the browser
//!   blocks the response, the gateway still serves it
//! - Header values are pre-rendered at startup, `apply` never allocates strings

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    response::Response,
};

use crate::config::schema::CorsConfig;
use crate::config::validation::ValidationError;

/// Per-request outcome of the origin policy.
#[derive(Debug, Clone)]
pub struct CorsDecision {
    pub headers: HeaderMap,
    pub short_circuit: bool,
}

impl CorsDecision {
    /// Copy the CORS headers onto an outgoing response, replacing any the
    /// upstream set. Without an allowed origin the response carries no
    /// `Access-Control-Allow-Origin` at all, whatever the upstream sent.
    pub fn write_to(&self, target: &mut HeaderMap) {
        if !self.headers.contains_key(ACCESS_CONTROL_ALLOW_ORIGIN) {
            target.remove(ACCESS_CONTROL_ALLOW_ORIGIN);
        }
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    /// `200` with no body and the CORS headers.
    pub fn preflight_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Compiled CORS configuration. Read-only after startup.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed_origins: Vec<String>,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: HeaderValue,
}

impl OriginPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, ValidationError> {
        for origin in &config.allowed_origins {
            HeaderValue::from_str(origin).map_err(|_| ValidationError::InvalidCors {
                field: "allowed_origins",
                value: origin.clone(),
            })?;
        }
        for method in &config.allowed_methods {
            if crate::routing::rule::parse_method(method).is_none() {
                return Err(ValidationError::InvalidCors {
                    field: "allowed_methods",
                    value: method.clone(),
                });
            }
        }
        for name in &config.allowed_headers {
            axum::http::HeaderName::from_bytes(name.as_bytes()).map_err(|_| ValidationError::InvalidCors {
                field: "allowed_headers",
                value: name.clone(),
            })?;
        }

        let render = |field: &'static str, items: &[String]| {
            let joined = items.join(", ");
            HeaderValue::from_str(&joined).map_err(|_| ValidationError::InvalidCors { field, value: joined })
        };

        Ok(Self {
            allowed_origins: config.allowed_origins.clone(),
            allow_methods: render("allowed_methods", &config.allowed_methods)?,
            allow_headers: render("allowed_headers", &config.allowed_headers)?,
            max_age: HeaderValue::from(config.max_age_secs),
        })
    }

    /// Exact, case-sensitive match against the allow-list. Empty never matches.
    pub fn is_allowed(&self, origin: &str) -> bool {
        !origin.is_empty() && self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// Compute the CORS headers for a request and whether it is a preflight.
    pub fn apply(&self, origin: Option<&HeaderValue>, method: &Method) -> CorsDecision {
        let mut headers = HeaderMap::with_capacity(5);

        if let Some(origin) = origin {
            if origin.to_str().map(|o| self.is_allowed(o)).unwrap_or(false) {
                headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
        }

        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());

        CorsDecision {
            headers,
            short_circuit: method == Method::OPTIONS,
        }
    }
}
