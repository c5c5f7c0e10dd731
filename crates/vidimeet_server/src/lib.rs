//! # Vidimeet Server - Socket.IO Signaling Relay
//!
//! Network front end of the Vidimeet random video chat. It accepts Socket.IO
//! clients, feeds their events to the transport-independent
//! [`vidimeet_matchmaker`] core, and delivers the core's outbound messages
//! back over the same sockets. Media flows peer-to-peer; only signaling and
//! text chat pass through here.
//!
//! ## Endpoints
//!
//! * **`/socket.io/`** - Socket.IO (Engine.IO v4, polling and WebSocket)
//! * **`GET /health`** - `{status, waitingUsers, activeRooms, timestamp}`
//! * **`GET /stats`** - `{totalUsers, waitingUsers, activeRooms, activeConnections}`
//! * **`/*`** - Static client files, when a public directory is configured
//!
//! ## Configuration
//!
//! The `vidimeet` binary reads a TOML file (created with defaults when
//! missing), applies `VIDIMEET_LISTEN_ADDR` / `PORT` from the environment,
//! then command-line flags. See [`config`].
//!
//! ## Example
//!
//! ```no_run
//! use vidimeet_server::{ServerConfig, SignalServer};
//!
//! # async fn run() -> Result<(), vidimeet_server::ServerError> {
//! let server = SignalServer::new(ServerConfig::default());
//! server.start().await
//! # }
//! ```

pub use error::ServerError;
pub use server::{ServerConfig, SignalServer};

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod server;
pub mod shutdown;
