//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::ServiceId;

/// Error type for configuration loading. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

impl From<ValidationError> for ConfigError {
    fn from(e: ValidationError) -> Self {
        ConfigError::Validation(vec![e])
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment (after reading `.env` if present), then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    match dotenvy::dotenv() {
        Ok(file) => tracing::debug!(path = %file.display(), "Loaded .env file"),
        Err(e) if e.not_found() => tracing::debug!(".env file not found"),
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an injected environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides. Blank values are ignored.
///
/// Numeric variables that fail to parse are logged and skipped.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(addr) = get("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(port) = get("PORT") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }

    for (key, id) in [
        ("USER_SERVICE_URL", ServiceId::User),
        ("CATALOG_SERVICE_URL", ServiceId::Catalog),
        ("RATING_SERVICE_URL", ServiceId::Rating),
        ("PLAYLIST_SERVICE_URL", ServiceId::Playlist),
    ] {
        if let Some(url) = get(key) {
            config.services.set_url(id, url);
        }
    }

    if let Some(origins) = get("CORS_ALLOWED_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }

    let timeouts = &mut config.timeouts;
    for (key, slot) in [
        ("CONNECT_TIMEOUT_SECS", &mut timeouts.connect_secs),
        ("REQUEST_TIMEOUT_SECS", &mut timeouts.request_secs),
        ("IDLE_TIMEOUT_SECS", &mut timeouts.idle_secs),
        ("DRAIN_TIMEOUT_SECS", &mut timeouts.drain_secs),
    ] {
        if let Some(raw) = get(key) {
            match raw.parse() {
                Ok(secs) => *slot = secs,
                Err(_) => tracing::warn!(variable = key, value = %raw, "Ignoring non-numeric timeout"),
            }
        }
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_services_and_port() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("PORT", "9000"),
                ("CATALOG_SERVICE_URL", "http://catalog:8002"),
                ("PLAYLIST_SERVICE_URL", "  "),
            ]),
        );

        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.services.catalog, "http://catalog:8002");
        assert_eq!(config.services.playlist, "http://localhost:8004");
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("CORS_ALLOWED_ORIGINS", " https://a.example , ,https://b.example")]),
        );
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn bad_numeric_override_is_ignored() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[("DRAIN_TIMEOUT_SECS", "soon"), ("CONNECT_TIMEOUT_SECS", "2")]),
        );
        assert_eq!(config.timeouts.drain_secs, 30);
        assert_eq!(config.timeouts.connect_secs, 2);
    }

    #[test]
    fn toml_sections_and_routes_parse() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:8181"

            [services]
            user = "http://users.internal:8001"

            [timeouts]
            drain_secs = 5

            [[routes]]
            path_prefix = "/api/v1/albums"
            methods = ["GET"]
            service = "catalog"

            [[routes]]
            path_prefix = "/api/v1/playlists"
            service = "playlist"
            requires_auth = true
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8181");
        assert_eq!(config.services.user, "http://users.internal:8001");
        assert_eq!(config.services.catalog, "http://localhost:8002");
        assert_eq!(config.timeouts.drain_secs, 5);
        assert_eq!(config.timeouts.connect_secs, 5);
        assert_eq!(config.routes.len(), 2);
        assert!(config.routes[1].requires_auth);
    }

    #[test]
    fn invalid_endpoint_is_fatal() {
        let err = load_config_with(None, env(&[("USER_SERVICE_URL", "http://")])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert!(matches!(
                errors[0],
                ValidationError::InvalidEndpointAddress { service: ServiceId::User, .. }
            )),
            other => panic!("unexpected error {other}"),
        }
    }
}
