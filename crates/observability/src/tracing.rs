//! Tracing subscriber initialization.
//!
//! Filtering follows `RUST_LOG`; the fallback directive applies only when it
//! is unset or invalid.

use tracing_subscriber::EnvFilter;

/// Output format of the process-wide subscriber.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON lines with timestamps (production).
    #[default]
    Json,
    /// Compact human-readable lines routed through the test writer.
    Compact,
}

/// JSON logs at `info` unless `RUST_LOG` says otherwise.
pub fn init() {
    init_with(LogFormat::Json, "info");
}

/// Install a subscriber. Safe to call multiple times (later calls are no-ops).
pub fn init_with(format: LogFormat, fallback_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Compact => builder.compact().with_test_writer().try_init(),
    };

    if installed.is_ok() {
        ::tracing::debug!(?format, "tracing subscriber installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init_with(LogFormat::Compact, "debug");
        init_with(LogFormat::Json, "info");
        init();
    }
}
