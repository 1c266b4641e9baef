//! Structured logging initialization, carried from the teacher's
//! `hip3-telemetry::logging` and generalized from the HIP-3 default target
//! to this system's (`tendril`).

use crate::error::{Result, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes structured logging: JSON output in production
/// (`RUST_ENV=production`), pretty output otherwise. `LOG_LEVEL`/`RUST_LOG`
/// feed the `EnvFilter` (§6.3); absent either, defaults to
/// `info,tendril=debug`.
pub fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tendril=debug"));

    let is_production = std::env::var("RUST_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);

    let result = if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
