//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → path.rs (canonical form, else redirect)
//!     → table.rs (ordered rule scan)
//!     → matcher.rs (path prefix AND method scope)
//!     → Return: (ServiceId, Access) or RoutingError::NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[] (or the built-in table)
//!     → rule.rs (parse methods, tag access)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins, in declaration order. Method-scoped rules must be
//!   declared before catch-alls sharing a prefix.

pub mod matcher;
pub mod path;
pub mod rule;
pub mod table;

pub use matcher::{Matcher, MethodScope, PathPrefixMatcher};
pub use path::clean_path;
pub use rule::{Access, RouteRule, ServiceId};
pub use table::{ResolvedRoute, RouteTable};
