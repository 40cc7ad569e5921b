//! Logging setup
//!
//! Logs go to stderr so stdout carries only the result. `GGRAMA_LOG` takes any
//! `EnvFilter` directive and wins over `--debug`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive
pub const LOG_ENV: &str = "GGRAMA_LOG";

const CRATES: [&str; 5] = [
    "ggrama",
    "ggrama_cli",
    "ggrama_config",
    "ggrama_core",
    "ggrama_llm",
];

/// Filter directive for the ggrama crates at the requested verbosity
pub fn default_filter(debug: bool) -> String {
    let level = if debug { "debug" } else { "warn" };
    std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|krate| format!("{}={}", krate, level)))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn init(debug: bool) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::new(directive),
        _ => EnvFilter::new(default_filter(debug)),
    };

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .try_init();
}
