//! Vidimeet relay server - Main Entry Point
//!
//! Parses arguments, loads configuration, starts the Socket.IO signaling
//! relay and shuts it down gracefully on SIGINT/SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

use vidimeet_server::{
    config::{self, Args, Config},
    logging, shutdown, ServerConfig, ServerError, SignalServer,
};

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = Instant::now();

    let args = Args::parse();

    // Logging has to be up before load_config runs, so read just the
    // [logging] section here.
    let file_logging = peek_logging_settings(&args).await;
    let level = logging::effective_level(
        args.debug,
        file_logging.as_ref().map(|l| l.level.as_str()),
    );
    let json_logs = args.json_logs || file_logging.as_ref().is_some_and(|l| l.json_format);
    logging::setup_logging(&level, json_logs)?;

    info!("Starting Vidimeet signaling relay");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::load_config(&args)
        .await
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    info!("Configuration loaded from: {}", args.config.display());

    let server_config = create_server_config(&config, &args)?;
    log_server_configuration(&server_config);

    let server = SignalServer::new(server_config);
    let mut shutdown_receiver = shutdown::setup_shutdown_handler().await;

    info!("Startup complete in {:.2?}", startup_start.elapsed());

    let serve = server.start();
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => {
            match result {
                Ok(()) => info!("Server stopped normally"),
                Err(e) => {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
        }
        Ok(()) = &mut shutdown_receiver => {
            let shutdown_start = Instant::now();
            info!("Shutdown signal received");
            if let Err(e) = server.shutdown().await {
                error!("Error during shutdown: {}", e);
            }
            // Let open HTTP requests drain before exiting.
            serve.await?;
            info!("Server shutdown completed in {:.2?}", shutdown_start.elapsed());
        }
    }

    Ok(())
}

/// Reads only the `[logging]` section of an existing config file.
///
/// Any problem here is ignored; `load_config` reports it properly once
/// logging is up.
async fn peek_logging_settings(args: &Args) -> Option<config::LoggingSettings> {
    let content = tokio::fs::read_to_string(&args.config).await.ok()?;
    toml::from_str::<Config>(&content).ok()?.logging
}

/// Create server configuration from loaded config and CLI arguments
fn create_server_config(config: &Config, args: &Args) -> Result<ServerConfig, ServerError> {
    let listen = args
        .listen
        .as_deref()
        .unwrap_or(config.server.listen_addr.as_str());
    let listen_addr: SocketAddr = listen
        .parse()
        .map_err(|e| ServerError::Config(format!("Invalid listen address {:?}: {}", listen, e)))?;

    let max_connections = args.max_connections.unwrap_or(config.server.max_connections);

    let public_dir = args
        .public_dir
        .clone()
        .or_else(|| config.server.public_dir.as_ref().map(PathBuf::from));

    Ok(ServerConfig {
        bind_address: listen_addr,
        max_connections,
        public_dir,
        cors_permissive: config.server.cors_permissive,
    })
}

/// Log the final server configuration
fn log_server_configuration(config: &ServerConfig) {
    info!("Server configuration:");
    info!("  Listen address: {}", config.bind_address);
    info!("  Max connections: {}", config.max_connections);
    info!("  Permissive CORS: {}", config.cors_permissive);
    match &config.public_dir {
        Some(dir) => info!("  Public directory: {}", dir.display()),
        None => info!("  Public directory: none"),
    }
}
