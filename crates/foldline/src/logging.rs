#![forbid(unsafe_code)]

//! Tracing subscriber bootstrap for hosts and tools.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! host's call. [`init`] is a convenience for binaries that want the standard
//! setup: an `EnvFilter` read from `FOLDLINE_LOG` (default `info`) and either
//! human-readable or JSON lines on stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "FOLDLINE_LOG";

/// Output format for [`init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed; that is not an
/// error, so repeated calls are harmless.
pub fn init(format: LogFormat) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(false);
    let installed = match format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(message = "logging.init", format = ?format);
    }
    installed
}
