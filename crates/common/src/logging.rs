//! Tracing setup for applications embedding the pipeline.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the host. These helpers install one scoped to the Framecut
//! crates so a host's own dependencies stay at `warn`.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{EditError, EditResult};

/// Targets that receive the configured level when it is a bare level name.
pub const FRAMECUT_TARGETS: [&str; 4] = [
    "framecut_common",
    "framecut_project_model",
    "framecut_processing_core",
    "framecut_render_engine",
];

/// Filter directives for `level`.
///
/// A bare level ("debug") is scoped to the Framecut crates with everything
/// else at `warn`. Anything else is taken as a full directive string.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.parse::<tracing::Level>().is_err() {
        return level.to_string();
    }
    let mut directives = vec!["warn".to_string()];
    directives.extend(FRAMECUT_TARGETS.iter().map(|t| format!("{t}={level}")));
    directives.join(",")
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if the
/// directives do not parse or a global subscriber is already set.
pub fn try_init_logging(config: &LoggingConfig) -> EditResult<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(&config.level))
            .map_err(|e| EditError::config(format!("invalid log level {:?}: {e}", config.level)))?,
    };

    let installed = if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    installed.map_err(|e| EditError::config(format!("tracing subscriber: {e}")))
}

/// Install the global subscriber, keeping any that is already set.
pub fn init_logging(config: &LoggingConfig) {
    if let Err(e) = try_init_logging(config) {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped_to_framecut() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("framecut_render_engine=debug"));
        assert!(directives.contains("framecut_common=debug"));
    }

    #[test]
    fn test_full_directive_passes_through() {
        assert_eq!(
            filter_directives("framecut_render_engine=trace,info"),
            "framecut_render_engine=trace,info"
        );
    }

    #[test]
    fn test_second_install_is_reported() {
        let config = LoggingConfig::default();
        // The first call may race other tests; the second always fails.
        init_logging(&config);
        let err = try_init_logging(&config).unwrap_err();
        assert!(matches!(err, EditError::Config { .. }));
    }
}
