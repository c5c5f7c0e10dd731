//! Configuration module for the Vidimeet relay server
//!
//! Handles command-line arguments, configuration file parsing, environment
//! overrides, and default settings.
//!
//! Precedence, highest first: command-line flags, environment variables,
//! configuration file, built-in defaults.

pub mod args;
pub mod settings;

pub use args::Args;
pub use settings::{Config, LoggingSettings, ServerSettings};

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Environment variable that replaces the whole listen address.
pub const LISTEN_ADDR_ENV: &str = "VIDIMEET_LISTEN_ADDR";

/// Environment variable that replaces only the listen port.
pub const PORT_ENV: &str = "PORT";

/// Load configuration from file or create default configuration
///
/// If the file doesn't exist, a default configuration file is written at
/// that path and the defaults are returned. Environment overrides are applied
/// to the result either way.
///
/// # Errors
/// * Returns error if file I/O operations fail
/// * Returns error if TOML parsing fails
pub async fn load_config(args: &Args) -> Result<Config> {
    let mut config = if args.config.exists() {
        let config_str = tokio::fs::read_to_string(&args.config)
            .await
            .with_context(|| format!("Failed to read config file {}", args.config.display()))?;
        match toml::from_str::<Config>(&config_str) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse config file {}: {}", args.config.display(), e);
                return Err(e.into());
            }
        }
    } else {
        warn!("Configuration file not found: {}, using defaults", args.config.display());

        let default_config = Config::default();
        let config_str = toml::to_string_pretty(&default_config)?;
        tokio::fs::write(&args.config, config_str)
            .await
            .with_context(|| format!("Failed to write default config {}", args.config.display()))?;
        info!("Created default configuration file: {}", args.config.display());

        default_config
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply `VIDIMEET_LISTEN_ADDR` and `PORT` to the loaded configuration.
///
/// `VIDIMEET_LISTEN_ADDR` wins when both are set. `PORT` keeps the configured
/// host and swaps the port; a value that is not a valid port is ignored with
/// a warning.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(addr) = lookup(LISTEN_ADDR_ENV) {
        info!("Listen address overridden by {}: {}", LISTEN_ADDR_ENV, addr);
        config.server.listen_addr = addr;
        return;
    }

    if let Some(port) = lookup(PORT_ENV) {
        match port.trim().parse::<u16>() {
            Ok(port) => {
                let host = config
                    .server
                    .listen_addr
                    .rsplit_once(':')
                    .map(|(host, _)| host)
                    .unwrap_or(config.server.listen_addr.as_str());
                config.server.listen_addr = format!("{}:{}", host, port);
                info!("Listen port overridden by {}: {}", PORT_ENV, port);
            }
            Err(e) => warn!("Ignoring invalid {} value {:?}: {}", PORT_ENV, port, e),
        }
    }
}
