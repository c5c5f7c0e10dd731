//! Error types for server operations.

/// Errors that can occur while configuring or running the relay server.
///
/// Failures inside the matchmaking core never reach this type: stale
/// references and malformed client events are absorbed and logged where
/// they happen.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or serving the listening socket failed
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}
