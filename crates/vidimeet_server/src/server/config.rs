//! Server configuration types and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration for [`SignalServer`](super::SignalServer).
///
/// Built from the TOML file and command-line flags by the binary; tests
/// construct it directly.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,

    /// Directory of static client files served as the router fallback
    pub public_dir: Option<PathBuf>,

    /// Attach a permissive CORS layer to every route
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: 10_000,
            public_dir: None,
            cors_permissive: true,
        }
    }
}

impl ServerConfig {
    pub fn with_bind_address(mut self, bind_address: SocketAddr) -> Self {
        self.bind_address = bind_address;
        self
    }

    pub fn with_max_connections(mut self, max_connections: usize) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_public_dir(mut self, public_dir: impl Into<PathBuf>) -> Self {
        self.public_dir = Some(public_dir.into());
        self
    }

    pub fn with_cors_permissive(mut self, cors_permissive: bool) -> Self {
        self.cors_permissive = cors_permissive;
        self
    }
}
