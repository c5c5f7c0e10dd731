//! Command-line argument parsing
//!
//! Defines the command-line interface of the `vidimeet` binary using clap's
//! derive API.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Vidimeet relay server
///
/// These arguments override the matching configuration file settings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    ///
    /// Specifies the path to the TOML configuration file.
    /// If the file doesn't exist, a default configuration will be created.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Server listen address
    ///
    /// Override the listen address from the configuration file.
    /// Format: "IP:PORT" (e.g., "127.0.0.1:3000" or "0.0.0.0:3000")
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Maximum number of concurrent connections
    #[arg(long)]
    pub max_connections: Option<usize>,

    /// Directory of static client files served at `/`
    #[arg(long)]
    pub public_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from("config.toml"),
            listen: None,
            max_connections: None,
            public_dir: None,
            debug: false,
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let args = Args::default();
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert!(!args.debug);
        assert!(!args.json_logs);
        assert!(args.listen.is_none());
        assert!(args.max_connections.is_none());
        assert!(args.public_dir.is_none());
    }

    #[test]
    fn test_args_parse_overrides() {
        let args = Args::parse_from([
            "vidimeet",
            "--config",
            "relay.toml",
            "--listen",
            "127.0.0.1:4000",
            "--max-connections",
            "50",
            "--public-dir",
            "web",
            "--debug",
            "--json-logs",
        ]);
        assert_eq!(args.config, PathBuf::from("relay.toml"));
        assert_eq!(args.listen.as_deref(), Some("127.0.0.1:4000"));
        assert_eq!(args.max_connections, Some(50));
        assert_eq!(args.public_dir, Some(PathBuf::from("web")));
        assert!(args.debug);
        assert!(args.json_logs);
    }
}
