//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled rules in declaration order
//! - Resolve (method, path) to the first matching rule
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan (acceptable for typical route counts)
//! - Explicit NoMatch rather than silent default

use axum::http::Method;

use crate::error::RoutingError;
use crate::routing::matcher::Matcher;
use crate::routing::rule::{Access, RouteRule, ServiceId};

/// Outcome of a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    pub rule: &'a RouteRule,
    pub service: ServiceId,
    pub access: Access,
}

impl ResolvedRoute<'_> {
    pub fn requires_auth(&self) -> bool {
        self.access.requires_auth()
    }
}

/// Ordered rule set. The first structural match wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// The built-in `/api/v1` table.
    ///
    /// Method-scoped public reads come before the protected catch-alls and
    /// write rules that share their prefix.
    pub fn default_rules() -> Self {
        use Access::{Protected, Public};
        use ServiceId::{Catalog, Playlist, Rating, User};

        let writes = || [Method::POST, Method::PUT, Method::DELETE];

        Self::new(vec![
            // Session endpoints
            RouteRule::any("/api/v1/auth/signup", User, Public),
            RouteRule::any("/api/v1/auth/login", User, Public),
            // Catalog browsing
            RouteRule::scoped("/api/v1/albums", [Method::GET], Catalog, Public),
            RouteRule::scoped("/api/v1/artists", [Method::GET], Catalog, Public),
            RouteRule::scoped("/api/v1/songs", [Method::GET], Catalog, Public),
            RouteRule::scoped("/api/v1/catalog", [Method::GET], Catalog, Public),
            // User management
            RouteRule::any("/api/v1/users", User, Protected),
            RouteRule::any("/api/v1/me", User, Protected),
            // Catalog writes
            RouteRule::scoped("/api/v1/albums", writes(), Catalog, Protected),
            RouteRule::scoped("/api/v1/artists", writes(), Catalog, Protected),
            RouteRule::scoped("/api/v1/songs", writes(), Catalog, Protected),
            // Ratings, reviews, preferences
            RouteRule::any("/api/v1/ratings", Rating, Protected),
            RouteRule::any("/api/v1/reviews", Rating, Protected),
            RouteRule::any("/api/v1/preferences", Rating, Protected),
            // Playlists
            RouteRule::any("/api/v1/playlists", Playlist, Protected),
        ])
    }

    /// Resolve a request line to its owning rule.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<ResolvedRoute<'_>, RoutingError> {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| ResolvedRoute {
                rule,
                service: rule.service,
                access: rule.access,
            })
            .ok_or(RoutingError::NoMatch)
    }

    /// Every rule matching the request line, in declaration order.
    #[cfg(test)]
    pub(crate) fn candidates<'a>(&'a self, method: &'a Method, path: &'a str) -> impl Iterator<Item = &'a RouteRule> + 'a {
        self.rules.iter().filter(move |rule| rule.matches(method, path))
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::default_rules()
    }
}
