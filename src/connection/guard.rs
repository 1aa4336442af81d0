// src/connection/guard.rs

//! A guard tied to the lifetime of a client connection.

use crate::core::state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::debug;

/// Maintains the connected-client gauge and guarantees that a session's
/// blocked waiters are removed however its task ends — clean close, protocol
/// error, or cancellation mid-block.
pub struct ConnectionGuard {
    state: Arc<ServerState>,
    session_id: u64,
    addr: SocketAddr,
}

impl ConnectionGuard {
    pub fn new(state: Arc<ServerState>, session_id: u64, addr: SocketAddr) -> Self {
        let clients = state.connected_clients.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Client {addr} connected (session {session_id}, {clients} total).");
        Self {
            state,
            session_id,
            addr,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.connected_clients.fetch_sub(1, Ordering::Relaxed);
        self.state
            .blocker_manager
            .remove_waiters_for_session(self.session_id);
        debug!(
            "Client {} disconnected (session {}).",
            self.addr, self.session_id
        );
    }
}
