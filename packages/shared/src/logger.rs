//! Logging setup utilities for the Kyodo binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter enables `default_log_level` for every crate listed in
/// `crate_names` (the binary and the libraries it drives). The log level can
/// be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_names` - Crate names as they appear in tracing targets (e.g. `kyodo_server`)
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use kyodo_shared::logger::setup_logger;
///
/// setup_logger(&["kyodo_server"], "debug");
/// ```
pub fn setup_logger(crate_names: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(crate_names, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(crate_names: &[&str], default_log_level: &str) -> String {
    crate_names
        .iter()
        .chain(std::iter::once(&"tower_http"))
        .map(|name| format!("{}={}", name.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}
