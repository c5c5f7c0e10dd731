//! Relay server: configuration, Socket.IO wiring, status routes and the
//! serve loop.

pub mod config;
pub mod core;
pub mod handlers;
pub mod status;

pub use self::config::ServerConfig;
pub use self::core::SignalServer;
pub use self::handlers::RelayMatchmaker;
