//! Core relay server implementation.
//!
//! [`SignalServer`] owns one matchmaker, the Socket.IO layer bound to it, and
//! the shutdown flag. It serves the Socket.IO endpoint, the status routes and
//! optional static files on a single port.

use crate::{
    error::ServerError,
    server::{
        config::ServerConfig,
        handlers::{self, RelayMatchmaker},
        status,
    },
};
use axum::Router;
use socketioxide::{layer::SocketIoLayer, SocketIo};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use vidimeet_matchmaker::{Matchmaker, SharedMatchmaker};

/// The signaling relay server.
///
/// # Lifecycle
///
/// 1. [`SignalServer::new`] creates the matchmaker and registers the
///    Socket.IO handlers
/// 2. [`SignalServer::start`] binds the configured address, or
///    [`SignalServer::serve`] runs on a listener the caller already bound
/// 3. [`SignalServer::shutdown`] stops accepting and lets in-flight HTTP
///    requests finish
pub struct SignalServer {
    /// Server configuration settings
    config: ServerConfig,

    /// The matchmaker shared by every socket handler and status route
    matchmaker: RelayMatchmaker,

    /// Socket.IO tower layer, mounted on the router
    socket_layer: SocketIoLayer,

    /// Set to `true` to begin graceful shutdown
    shutdown_sender: watch::Sender<bool>,
}

impl SignalServer {
    /// Creates a new relay server with the specified configuration.
    ///
    /// The matchmaker is capped at `config.max_connections` live
    /// connections. Nothing is bound until [`start`](Self::start) or
    /// [`serve`](Self::serve) is called.
    pub fn new(config: ServerConfig) -> Self {
        let (socket_layer, io) = SocketIo::new_layer();
        let matchmaker = SharedMatchmaker::new(Matchmaker::with_capacity(config.max_connections));
        handlers::register(&io, matchmaker.clone());

        let (shutdown_sender, _) = watch::channel(false);

        Self {
            config,
            matchmaker,
            socket_layer,
            shutdown_sender,
        }
    }

    /// Builds the HTTP application.
    ///
    /// Routes: the Socket.IO endpoint (`/socket.io/`), `GET /health`,
    /// `GET /stats`, and static files from the public directory as the
    /// fallback when one is configured.
    pub fn router(&self) -> Router {
        let mut app = status::router(self.matchmaker.clone());
        if let Some(public_dir) = &self.config.public_dir {
            app = app.fallback_service(ServeDir::new(public_dir));
        }

        let app = app.layer(self.socket_layer.clone());
        let app = if self.config.cors_permissive {
            app.layer(CorsLayer::permissive())
        } else {
            app
        };
        app.layer(TraceLayer::new_for_http())
    }

    /// Binds the configured address and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Network`] if the address cannot be bound or the
    /// server fails while running.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| {
                ServerError::Network(format!("Failed to bind {}: {}", self.config.bind_address, e))
            })?;
        self.serve(listener).await
    }

    /// Serves on an already-bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Network(e.to_string()))?;
        info!("🚀 Vidimeet relay listening on {}", local_addr);
        if let Some(public_dir) = &self.config.public_dir {
            info!("📁 Serving static files from {}", public_dir.display());
        }

        let mut shutdown = self.shutdown_sender.subscribe();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await
            .map_err(|e| ServerError::Network(format!("Server error: {}", e)))?;

        info!("Relay on {} stopped", local_addr);
        Ok(())
    }

    /// Signals a running [`serve`](Self::serve) to stop.
    ///
    /// Safe to call before the server starts; it will then stop immediately.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("🛑 Shutting down server...");
        self.shutdown_sender.send_replace(true);
        Ok(())
    }

    /// The matchmaker behind this server.
    pub fn matchmaker(&self) -> &RelayMatchmaker {
        &self.matchmaker
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
