//! tracing-subscriber setup driven by the `[logging]` config section.
//!
//! Logs go to stderr; stdout carries plans and config dumps.

use quarry_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format resolved from config and CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pretty,
    Json,
}

/// Filter directive used when RUST_LOG is unset.
///
/// `--verbose` raises the quarry crates to debug without flooding the
/// output with dependency logs.
fn default_directive(level: &str, verbose: bool) -> String {
    if verbose {
        format!("{level},quarry=debug,quarry_core=debug")
    } else {
        level.to_string()
    }
}

fn resolve_format(config: &LoggingConfig, json_override: bool) -> Format {
    if json_override || config.format == "json" {
        Format::Json
    } else {
        Format::Pretty
    }
}

/// Install the global subscriber. RUST_LOG takes precedence over the config level.
pub fn init(config: &LoggingConfig, verbose: bool, json_override: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level, verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    match resolve_format(config, json_override) {
        Format::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        Format::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
