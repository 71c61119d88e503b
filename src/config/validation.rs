//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every service base URL must be a usable upstream address
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Compile configured routes and CORS values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, RouteConfig};
use crate::routing::{rule::parse_method, RouteRule, RouteTable, ServiceId};
use crate::security::OriginPolicy;
use crate::upstream::ServiceEndpoint;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid endpoint address for {service} service ({address}): {reason}")]
    InvalidEndpointAddress {
        service: ServiceId,
        address: String,
        reason: String,
    },

    #[error("invalid bind address {0}")]
    InvalidBindAddress(String),

    #[error("invalid metrics address {0}")]
    InvalidMetricsAddress(String),

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("invalid route {name}: {reason}")]
    InvalidRoute { name: String, reason: String },

    #[error("invalid cors {field} entry {value:?}")]
    InvalidCors { field: &'static str, value: String },
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let positive = [
        ("listener.max_connections", config.listener.max_connections as u64),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.idle_secs", config.timeouts.idle_secs),
        ("timeouts.drain_secs", config.timeouts.drain_secs),
        ("pool.max_connections_per_service", config.pool.max_connections_per_service as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::NonPositive { field });
        }
    }

    for id in ServiceId::ALL {
        if let Err(e) = ServiceEndpoint::parse(id, config.services.url_for(id)) {
            errors.push(e);
        }
    }

    if let Err(e) = OriginPolicy::from_config(&config.cors) {
        errors.push(e);
    }

    for route in &config.routes {
        if let Err(e) = compile_route(route) {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Build the route table: configured routes in order, or the built-in table.
pub fn compile_routes(routes: &[RouteConfig]) -> Result<RouteTable, ValidationError> {
    if routes.is_empty() {
        return Ok(RouteTable::default_rules());
    }
    let rules = routes.iter().map(compile_route).collect::<Result<Vec<_>, _>>()?;
    Ok(RouteTable::new(rules))
}

fn compile_route(route: &RouteConfig) -> Result<RouteRule, ValidationError> {
    let name = route
        .name
        .clone()
        .unwrap_or_else(|| route.path_prefix.clone());

    if !route.path_prefix.starts_with('/') {
        return Err(ValidationError::InvalidRoute {
            name,
            reason: "path_prefix must start with '/'".to_string(),
        });
    }

    let mut methods = Vec::with_capacity(route.methods.len());
    for raw in &route.methods {
        match parse_method(raw) {
            Some(m) => methods.push(m),
            None => {
                return Err(ValidationError::InvalidRoute {
                    name,
                    reason: format!("unknown method {raw:?}"),
                })
            }
        }
    }

    let rule = RouteRule::scoped(
        &route.path_prefix,
        methods,
        route.service,
        route.requires_auth.into(),
    );
    Ok(match &route.name {
        Some(n) => rule.named(n.clone()),
        None => rule,
    })
}
