// src/core/storage/ttl.rs

//! Scheduled string expiry.
//!
//! Every `SET` with a TTL schedules one deletion callback at the absolute
//! expiry instant. The callback and the read-time lazy check both guard on
//! the stored expiry value itself, so a value written in the interim — even
//! to the same key — is never deleted by a stale timer.

use crate::core::storage::keyspace::Keyspace;
use bytes::Bytes;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Schedules the deletion of `key` at `deadline`. Fires exactly once; the
/// keyspace ignores the callback unless the value is still the same string
/// with this exact expiry.
pub(crate) fn schedule(keyspace: Arc<Keyspace>, key: Bytes, deadline: Instant) {
    debug!(
        "scheduling expiry for {:?} at {:?}",
        String::from_utf8_lossy(&key),
        deadline
    );
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        keyspace.delete_if_expired(&key, deadline);
    });
}
