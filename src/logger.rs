//! Logging setup on top of `tracing`.
//!
//! Logs always go to stderr so that extracted records on stdout can be piped
//! straight into another tool.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogLevel;

const CRATE_TARGET: &str = "mvn_docs";

/// Builds the filter in precedence order: explicit level, `verbose`,
/// `RUST_LOG`, then `info`.
pub fn build_filter(level: Option<LogLevel>, verbose: bool) -> EnvFilter {
    if let Some(level) = level {
        return crate_filter(level);
    }
    if verbose {
        return crate_filter(LogLevel::Debug);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| crate_filter(LogLevel::Info))
}

pub fn init_logger(level: Option<LogLevel>, verbose: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(build_filter(level, verbose))
        .with(fmt_layer)
        .try_init();
}

fn crate_filter(level: LogLevel) -> EnvFilter {
    match level {
        LogLevel::Off => EnvFilter::new("off"),
        other => EnvFilter::new(format!("warn,{CRATE_TARGET}={}", other.as_filter())),
    }
}
