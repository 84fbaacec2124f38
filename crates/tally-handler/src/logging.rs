//! Logging initialisation
//!
//! Output goes to stderr so stdout stays free for command results. The
//! filter defaults to `info` and honours `RUST_LOG`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per event, with span fields
    Json,
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed (e.g. by a test
/// harness); the existing one is left in place.
pub fn init(format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.is_ok()
}
