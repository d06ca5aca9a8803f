//! Logging setup utilities for the chat server.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, ANSI coloured lines
    #[default]
    Pretty,
    /// One JSON object per line (for containers / log shippers)
    Json,
}

/// Build the default filter directive when `RUST_LOG` is not set.
///
/// Both the library crates and the binary are enabled at `default_log_level`.
/// `tower_http` is included so that the HTTP trace layer is visible as well.
pub fn default_filter_directive(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "hanashi_server={level},hanashi_shared={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hanashi-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
/// * `format` - Pretty or JSON output
///
/// # Examples
///
/// ```no_run
/// use hanashi_shared::logger::{LogFormat, setup_logger};
///
/// setup_logger("hanashi-server", "debug", LogFormat::Pretty);
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter_directive(binary_name, default_log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false),
            )
            .init(),
    }
}
