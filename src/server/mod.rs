// src/server/mod.rs

//! The listener and accept loop.

use crate::config::Config;
use crate::connection::ConnectionHandler;
use crate::core::state::ServerState;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Binds the listener and runs the accept loop until a shutdown signal.
/// Every accepted connection gets its own task and session id; a Ctrl-C
/// broadcasts shutdown to all of them.
pub async fn run(config: Config) -> Result<()> {
    let state = ServerState::new();
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("CitrineDB listening on {addr}");

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, notifying connections.");
                let _ = shutdown_tx.send(());
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        let session_id = state.allocate_session_id();
                        let state = state.clone();
                        let shutdown_rx = shutdown_tx.subscribe();
                        tokio::spawn(async move {
                            let mut handler = ConnectionHandler::new(
                                socket,
                                peer,
                                state,
                                session_id,
                                shutdown_rx,
                            );
                            if let Err(e) = handler.run().await {
                                warn!("Connection handler for {peer} exited with error: {e}");
                            }
                        });
                    }
                    Err(e) => warn!("Failed to accept connection: {e}"),
                }
            }
        }
    }

    Ok(())
}
