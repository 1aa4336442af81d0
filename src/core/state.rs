// src/core/state.rs

//! Shared server state and the per-command execution context.

use crate::core::blocking::BlockerManager;
use crate::core::storage::Keyspace;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// State shared by every connection task: the keyspace, the blocking
/// dispatcher, and a couple of counters.
#[derive(Debug)]
pub struct ServerState {
    pub keyspace: Arc<Keyspace>,
    pub blocker_manager: Arc<BlockerManager>,
    next_session_id: AtomicU64,
    pub connected_clients: AtomicUsize,
}

impl ServerState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            keyspace: Arc::new(Keyspace::new()),
            blocker_manager: Arc::new(BlockerManager::new()),
            next_session_id: AtomicU64::new(1),
            connected_clients: AtomicUsize::new(0),
        })
    }

    /// Hands out a fresh session id for a newly accepted connection.
    pub fn allocate_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Everything a command needs while executing.
pub struct ExecutionContext {
    pub state: Arc<ServerState>,
    pub session_id: u64,
}
