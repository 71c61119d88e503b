//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive, plain string prefix)
//! - Match method scope (any, or an explicit set)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Empty method list = `MethodScope::Any` (wildcard)
//! - No regex to guarantee O(n) matching

use axum::http::Method;

/// Trait for matching a request line against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Method condition of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodScope {
    /// Every method matches.
    Any,
    /// Only the listed methods match.
    Only(Vec<Method>),
}

impl MethodScope {
    /// Build a scope from a method list. An empty list means [`MethodScope::Any`].
    pub fn from_methods(allowed: impl IntoIterator<Item = Method>) -> Self {
        let mut methods: Vec<Method> = Vec::new();
        for m in allowed {
            if !methods.contains(&m) {
                methods.push(m);
            }
        }
        if methods.is_empty() {
            MethodScope::Any
        } else {
            MethodScope::Only(methods)
        }
    }
}

impl Matcher for MethodScope {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        match self {
            MethodScope::Any => true,
            MethodScope::Only(methods) => methods.contains(method),
        }
    }
}
