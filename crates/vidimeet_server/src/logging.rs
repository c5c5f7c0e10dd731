//! Logging system setup and configuration
//!
//! This module initializes the `tracing` subscriber used by the relay for
//! lifecycle, matching and diagnostic output.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global logging system.
///
/// The filter honours `RUST_LOG` when it is set and falls back to `level`
/// otherwise.
///
/// # Arguments
/// * `level` - Default filter directive, e.g. `"info"` or `"vidimeet_matchmaker=debug"`
/// * `json_format` - Emit one JSON object per line instead of human-readable text
///
/// # Errors
/// * Returns an error if a global subscriber has already been installed
pub fn setup_logging(level: &str, json_format: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json_format {
        registry.with(fmt::layer().json().with_target(false)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

/// Resolve the effective log level from the `--debug` flag and the
/// optional `[logging]` section.
pub fn effective_level(debug: bool, configured: Option<&str>) -> String {
    if debug {
        "debug".to_string()
    } else {
        configured.unwrap_or("info").to_string()
    }
}
