//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once, before configuration is read
//! - Honour `RUST_LOG`, falling back to the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Default filter scopes the configured level to this crate and tower_http
//! - The filter sits behind a reload handle so config loading can log at a
//!   bootstrap level and the configured level applies afterwards

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Default directive string for a configured level.
pub fn default_directives(level: &str) -> String {
    format!("vinyl_gateway={level},tower_http={level}")
}

/// Handle to the installed filter.
pub struct LogHandle {
    reload: Option<reload::Handle<EnvFilter, Registry>>,
    from_env: bool,
}

impl LogHandle {
    /// Switch to the configured level. No-op when `RUST_LOG` chose the
    /// filter or another subscriber was already installed.
    pub fn set_level(&self, level: &str) {
        if self.from_env {
            return;
        }
        if let Some(handle) = &self.reload {
            if let Err(e) = handle.reload(EnvFilter::new(default_directives(level))) {
                tracing::warn!(error = %e, level, "Failed to apply configured log level");
            }
        }
    }

    /// Whether `RUST_LOG` supplied the filter.
    pub fn from_env(&self) -> bool {
        self.from_env
    }

    /// Whether this call installed the global subscriber.
    pub fn is_installed(&self) -> bool {
        self.reload.is_some()
    }
}

/// Install the global subscriber. Later calls install nothing.
pub fn init_logging(level: &str) -> LogHandle {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_directives(level)), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    LogHandle {
        reload: installed.then_some(handle),
        from_env,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_crate_and_http_layer() {
        let d = default_directives("debug");
        assert!(EnvFilter::try_new(&d).is_ok());
        assert!(d.contains("vinyl_gateway=debug"));
        assert!(d.contains("tower_http=debug"));
    }

    #[test]
    fn bootstrap_level_is_replaced_by_configured_level() {
        let handle = init_logging("warn");
        if handle.from_env() || !handle.is_installed() {
            return;
        }
        // Warnings emitted while loading config are visible.
        assert!(tracing::enabled!(tracing::Level::WARN));
        assert!(!tracing::enabled!(tracing::Level::DEBUG));

        handle.set_level("debug");
        assert!(tracing::enabled!(tracing::Level::DEBUG));
    }
}
