//! Structured logging initialization.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ControllerError, ControllerResult};

/// Initialize structured logging.
///
/// `RUST_LOG` takes precedence over `default_filter`. JSON output when
/// `RUST_ENV=production`, human-readable otherwise.
///
/// # Errors
/// Returns `ControllerError::LoggingInit` if a global subscriber is already set.
pub fn init_logging(default_filter: &str) -> ControllerResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    };

    result.map_err(|e| ControllerError::LoggingInit(e.to_string()))
}
