//! Graceful shutdown handling
//!
//! Listens for termination signals and reports them through a oneshot
//! channel so the caller can stop the server cleanly.

use std::future::Future;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Set up a shutdown signal handler
///
/// Spawns a task that waits for a termination signal and then fires the
/// returned receiver.
///
/// # Platform Support
/// * Unix/Linux: Handles SIGINT (Ctrl+C) and SIGTERM signals
/// * Windows: Handles Ctrl+C events
///
/// If the signal handlers cannot be installed the error is logged and the
/// receiver never fires; the server then runs until killed.
pub async fn setup_shutdown_handler() -> oneshot::Receiver<()> {
    forward_shutdown(wait_for_signal())
}

/// Fires the returned receiver once `signal` completes successfully.
///
/// On failure the sender is parked instead of dropped, so the receiver stays
/// pending rather than resolving with a closed-channel error.
fn forward_shutdown<F>(signal: F) -> oneshot::Receiver<()>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                error!("Failed to install shutdown signal handlers: {}", e);
                let _tx = tx;
                std::future::pending::<()>().await;
            }
        }
    });

    rx
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received - initiating graceful shutdown");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received - initiating graceful shutdown");
        }
    }
    Ok(())
}

#[cfg(windows)]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received - initiating graceful shutdown");
    Ok(())
}
