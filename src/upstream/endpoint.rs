//! Service endpoint abstraction.
//!
//! # Responsibilities
//! - Parse and validate a service base URL
//! - Rewrite an inbound URI onto the endpoint (scheme, authority, base path)

use axum::http::{
    uri::{Authority, PathAndQuery, Scheme},
    Uri,
};
use url::Url;

use crate::config::validation::ValidationError;
use crate::routing::ServiceId;

/// A backend's resolved address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub id: ServiceId,
    pub base_url: Url,
    authority: Authority,
    base_path: String,
}

impl ServiceEndpoint {
    /// Parse a base URL such as `http://catalog:8002` or `http://10.0.0.4/catalog`.
    ///
    /// Only plain `http` upstreams are accepted; query strings and fragments
    /// are rejected since they cannot be merged with forwarded requests.
    pub fn parse(id: ServiceId, raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidEndpointAddress {
            service: id,
            address: raw.to_string(),
            reason: reason.to_string(),
        };

        let base_url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        if base_url.scheme() != "http" {
            return Err(invalid("only http upstreams are supported"));
        }
        let host = base_url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?;
        if base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed"));
        }
        if !base_url.username().is_empty() || base_url.password().is_some() {
            return Err(invalid("credentials in the address are not allowed"));
        }

        let port = base_url.port_or_known_default().unwrap_or(80);
        let authority: Authority = format!("{host}:{port}")
            .parse()
            .map_err(|_| invalid("unusable host"))?;
        let base_path = base_url.path().trim_end_matches('/').to_string();

        Ok(Self {
            id,
            base_url,
            authority,
            base_path,
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Map an inbound request URI onto this endpoint, preserving the query.
    pub fn target_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_path(&self.base_path, inbound.path());
        let path_and_query = match inbound.query() {
            Some(q) => format!("{path}?{q}"),
            None => path,
        };

        let uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(PathAndQuery::try_from(path_and_query)?)
            .build()?;
        Ok(uri)
    }
}

/// Join with exactly one slash between base and request path.
fn join_path(base: &str, path: &str) -> String {
    match (base.is_empty(), path.starts_with('/')) {
        (true, true) => path.to_string(),
        (true, false) => format!("/{path}"),
        (false, true) => format!("{base}{path}"),
        (false, false) => format!("{base}/{path}"),
    }
}
