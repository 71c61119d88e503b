//! Route rule definitions.
//!
//! A rule is a path prefix, a method scope, the owning service and whether a
//! bearer credential is required. Rules never change after startup.

use std::fmt;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::routing::matcher::{Matcher, MethodScope, PathPrefixMatcher};

/// Logical name of a backend service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceId {
    User,
    Catalog,
    Rating,
    Playlist,
}

impl ServiceId {
    pub const ALL: [ServiceId; 4] = [
        ServiceId::User,
        ServiceId::Catalog,
        ServiceId::Rating,
        ServiceId::Playlist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::User => "user",
            ServiceId::Catalog => "catalog",
            ServiceId::Rating => "rating",
            ServiceId::Playlist => "playlist",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a rule needs a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

impl Access {
    pub fn requires_auth(&self) -> bool {
        matches!(self, Access::Protected)
    }
}

impl From<bool> for Access {
    fn from(requires_auth: bool) -> Self {
        if requires_auth {
            Access::Protected
        } else {
            Access::Public
        }
    }
}

/// A compiled routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// Identifier for logging/metrics.
    pub name: String,
    pub prefix: PathPrefixMatcher,
    pub methods: MethodScope,
    pub service: ServiceId,
    pub access: Access,
}

impl RouteRule {
    /// Rule accepting every method under `prefix`.
    pub fn any(prefix: &str, service: ServiceId, access: Access) -> Self {
        Self::scoped(prefix, Vec::new(), service, access)
    }

    /// Rule limited to `methods` under `prefix`.
    pub fn scoped(
        prefix: &str,
        methods: impl IntoIterator<Item = Method>,
        service: ServiceId,
        access: Access,
    ) -> Self {
        let methods = MethodScope::from_methods(methods);
        let name = match &methods {
            MethodScope::Any => format!("{prefix} *"),
            MethodScope::Only(list) => {
                let list: Vec<&str> = list.iter().map(Method::as_str).collect();
                format!("{prefix} {}", list.join(","))
            }
        };
        Self {
            name,
            prefix: PathPrefixMatcher::new(prefix),
            methods,
            service,
            access,
        }
    }

    /// Override the generated name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Matcher for RouteRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.prefix.matches(method, path) && self.methods.matches(method, path)
    }
}

/// Parse a configured method name. Case-insensitive.
pub fn parse_method(raw: &str) -> Option<Method> {
    let upper = raw.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }
    Method::from_bytes(upper.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_requires_prefix_and_method() {
        let rule = RouteRule::scoped(
            "/api/v1/albums",
            [Method::POST],
            ServiceId::Catalog,
            Access::Protected,
        );
        assert!(rule.matches(&Method::POST, "/api/v1/albums/7"));
        assert!(!rule.matches(&Method::GET, "/api/v1/albums/7"));
        assert!(!rule.matches(&Method::POST, "/api/v1/songs"));
        assert_eq!(rule.name, "/api/v1/albums POST");
    }

    #[test]
    fn parse_method_normalizes_case() {
        assert_eq!(parse_method("get"), Some(Method::GET));
        assert_eq!(parse_method(" Delete "), Some(Method::DELETE));
        assert_eq!(parse_method(""), None);
        assert_eq!(parse_method("GE T"), None);
    }

    #[test]
    fn service_id_serde_names() {
        let id: ServiceId = serde_json::from_str("\"playlist\"").unwrap();
        assert_eq!(id, ServiceId::Playlist);
        assert_eq!(ServiceId::Rating.to_string(), "rating");
    }
}
