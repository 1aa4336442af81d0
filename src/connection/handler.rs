// src/connection/handler.rs

//! Defines the `ConnectionHandler` which manages the full lifecycle of a
//! client connection: parse, dispatch, encode, flush, repeat.

use super::guard::ConnectionGuard;
use crate::core::protocol::{RespFrame, RespFrameCodec};
use crate::core::state::{ExecutionContext, ServerState};
use crate::core::{CitrineError, Command};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// Manages the full lifecycle of a client connection.
pub struct ConnectionHandler {
    framed: Framed<TcpStream, RespFrameCodec>,
    addr: SocketAddr,
    state: Arc<ServerState>,
    session_id: u64,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ConnectionHandler {
    pub fn new(
        socket: TcpStream,
        addr: SocketAddr,
        state: Arc<ServerState>,
        session_id: u64,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            framed: Framed::new(socket, RespFrameCodec),
            addr,
            state,
            session_id,
            shutdown_rx,
        }
    }

    /// The main event loop for the connection.
    ///
    /// Command-level failures (unknown command, wrong arity, type mismatch,
    /// domain errors) are reported as RESP errors and the loop continues.
    /// Codec failures and EOF close the connection.
    pub async fn run(&mut self) -> Result<(), CitrineError> {
        let _guard = ConnectionGuard::new(self.state.clone(), self.session_id, self.addr);
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Connection handler for {} received shutdown signal.", self.addr);
                    let _ = self
                        .framed
                        .send(RespFrame::Error("server is shutting down".to_string()))
                        .await;
                    break;
                }
                result = self.framed.next() => {
                    match result {
                        Some(Ok(frame)) => {
                            debug!("Session {}: received frame: {:?}", self.session_id, frame);
                            match self.process_frame(frame).await {
                                Ok(()) => {}
                                Err(e) if e.is_fatal() => {
                                    warn!("Connection error for {}: {}", self.addr, e);
                                    break;
                                }
                                Err(e) => self.send_error_to_client(e).await?,
                            }
                        }
                        Some(Err(e)) => {
                            if is_normal_disconnect(&e) {
                                debug!("Connection from {} closed by peer: {}", self.addr, e);
                            } else {
                                warn!("Protocol error from {}, closing connection: {}", self.addr, e);
                            }
                            break;
                        }
                        None => {
                            debug!("Connection from {} closed by peer.", self.addr);
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Parses a command frame, executes it, and sends the response.
    async fn process_frame(&mut self, frame: RespFrame) -> Result<(), CitrineError> {
        let command = Command::try_from(frame)?;
        debug!(
            "Session {}: received command: {}",
            self.session_id,
            command.name()
        );

        let mut ctx = ExecutionContext {
            state: self.state.clone(),
            session_id: self.session_id,
        };
        let response = command.execute(&mut ctx).await?;
        self.framed.send(response.into()).await?;
        Ok(())
    }

    /// Sends an error frame back to the client; the connection stays open.
    async fn send_error_to_client(&mut self, e: CitrineError) -> Result<(), CitrineError> {
        debug!("Session {}: sending error response: {}", self.session_id, e);
        self.framed.send(RespFrame::Error(e.to_string())).await?;
        Ok(())
    }
}

/// Helper function to check for non-critical disconnection errors.
fn is_normal_disconnect(e: &CitrineError) -> bool {
    matches!(e, CitrineError::Io(arc_err) if matches!(
        arc_err.kind(),
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionAborted
    ))
}
