//! Configuration settings structures
//!
//! Defines the TOML configuration file layout: a required `[server]`
//! section and an optional `[logging]` section.

use serde::{Deserialize, Serialize};

/// Default for max_connections
fn default_max_connections() -> usize {
    10_000
}

fn default_cors_permissive() -> bool {
    true
}

/// Main configuration structure
///
/// This is the root configuration object. It can be serialized to/from TOML
/// format for configuration files.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Server-specific settings
    pub server: ServerSettings,
    /// Optional logging configuration
    pub logging: Option<LoggingSettings>,
}

/// Server configuration settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerSettings {
    /// Network address to bind the server to
    ///
    /// Format: "IP:PORT" (e.g., "127.0.0.1:3000" for localhost,
    /// "0.0.0.0:3000" for all interfaces)
    pub listen_addr: String,

    /// Maximum number of concurrent client connections
    ///
    /// Connections beyond this limit receive an `error` event and are
    /// disconnected immediately.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Allow cross-origin requests from any origin
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,

    /// Directory of static client files served at `/`
    #[serde(default)]
    pub public_dir: Option<String>,
}

/// Logging system configuration
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LoggingSettings {
    /// Logging level filter
    ///
    /// Valid values: "trace", "debug", "info", "warn", "error", or any
    /// `tracing_subscriber::EnvFilter` directive.
    pub level: String,

    /// Enable JSON-formatted log output
    pub json_format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                listen_addr: "0.0.0.0:3000".to_string(),
                max_connections: default_max_connections(),
                cors_permissive: true,
                public_dir: None,
            },
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            }),
        }
    }
}
