// src/core/blocking.rs

//! Manages clients that are blocked waiting for data on list keys (`BLPOP`).
//!
//! Stream readers do not come through here: a blocked `XREAD` holds the
//! watched streams' own notification handles (see `storage::stream`).

use crate::core::storage::data_types::DataValue;
use crate::core::storage::keyspace::Keyspace;
use crate::core::storage::list::List;
use crate::core::{CitrineError, RespValue};
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

/// The value handed to a woken `BLPOP` client.
#[derive(Debug, Clone)]
pub struct PoppedValue {
    pub key: Bytes,
    pub value: Bytes,
}

/// The waker carries the popped value, so the woken client never re-reads.
type Waker = oneshot::Sender<PoppedValue>;

/// A shareable waker slot. The `Option` allows it to be `take()`-n exactly
/// once, by either the notifier or the timing-out waiter — whichever locks
/// the slot first.
type SharedWaker = Arc<Mutex<Option<Waker>>>;

/// A waiting client: its session id (for disconnect cleanup) and its slot.
#[derive(Clone, Debug)]
struct WaiterInfo {
    session_id: u64,
    waker: SharedWaker,
}

/// Manages all clients currently blocked on list pops, as per-key FIFO
/// queues. Registration order decides who a push serves first.
#[derive(Debug, Default)]
pub struct BlockerManager {
    waiters: DashMap<Bytes, VecDeque<WaiterInfo>>,
}

impl BlockerManager {
    pub fn new() -> Self {
        Default::default()
    }

    /// Orchestrates a blocking pop on one key.
    ///
    /// Phase 1 runs under the keyspace lock: pop immediately if the list has
    /// a head, otherwise register the waiter before the lock is released, so
    /// no push can slip between the emptiness check and the registration.
    /// Phase 2 awaits the slot or the timeout (`None` waits forever).
    /// Phase 3 removes the waiter again, by identity, idempotently.
    pub async fn orchestrate_blocking_pop(
        self: &Arc<Self>,
        keyspace: &Keyspace,
        key: &Bytes,
        wait_timeout: Option<Duration>,
        session_id: u64,
    ) -> Result<RespValue, CitrineError> {
        let (mut rx, shared_waker) = {
            let mut entries = keyspace.lock_entries();
            if let Some(entry) = entries.get_mut(key) {
                let DataValue::List(list) = &mut entry.data else {
                    return Err(CitrineError::WrongType);
                };
                if let Some(value) = list.lpop() {
                    return Ok(pop_reply(key.clone(), value));
                }
            }

            let (tx, rx) = oneshot::channel();
            let shared_waker: SharedWaker = Arc::new(Mutex::new(Some(tx)));
            self.waiters
                .entry(key.clone())
                .or_default()
                .push_back(WaiterInfo {
                    session_id,
                    waker: shared_waker.clone(),
                });
            debug!(
                "Session {}: registered to block on list key {:?}",
                session_id,
                String::from_utf8_lossy(key)
            );
            (rx, shared_waker)
            // The keyspace lock drops here; any later push sees the waiter.
        };

        let outcome = match wait_timeout {
            None => (&mut rx).await.ok(),
            Some(timeout) => {
                tokio::select! {
                    result = &mut rx => result.ok(),
                    _ = tokio::time::sleep(timeout) => {
                        // Timed out. Reclaim the slot; if a notifier already
                        // took it, the hand-off completed under the slot's
                        // mutex and the value is sitting in the channel.
                        if shared_waker.lock().take().is_some() {
                            None
                        } else {
                            rx.try_recv().ok()
                        }
                    }
                }
            }
        };

        self.remove_waiter(key, &shared_waker);

        match outcome {
            Some(popped) => Ok(pop_reply(popped.key, popped.value)),
            None => Ok(RespValue::NullArray),
        }
    }

    /// Called by the push path, still under the keyspace lock, right after
    /// the mutation. Walks the key's queue in registration order and serves
    /// the FIRST waiter whose slot is still live: the list head is popped and
    /// sent through the slot. Stale waiters are dropped along the way; a
    /// failed send restores the element to the head and tries the next
    /// waiter. At most one waiter is served per push call.
    pub fn serve_first_waiter(&self, key: &Bytes, list: &mut List) {
        loop {
            let Some(mut queue) = self.waiters.get_mut(key) else {
                return;
            };
            let Some(slot_arc) = queue.front().map(|info| info.waker.clone()) else {
                return;
            };
            let mut slot = slot_arc.lock();
            let Some(waker) = slot.take() else {
                // Slot already claimed by a timeout; discard the entry.
                drop(slot);
                queue.pop_front();
                continue;
            };
            let Some(value) = list.lpop() else {
                // Nothing to hand off after all; put the waker back.
                *slot = Some(waker);
                return;
            };
            // Send while holding the slot so a concurrent timeout observes
            // either a full hand-off or none.
            match waker.send(PoppedValue {
                key: key.clone(),
                value,
            }) {
                Ok(()) => {
                    drop(slot);
                    queue.pop_front();
                    debug!(
                        "handed off list head for {:?} to a blocked client",
                        String::from_utf8_lossy(key)
                    );
                    return;
                }
                Err(popped) => {
                    // Receiver is gone (client vanished mid-block); the
                    // element goes back to the head, the next waiter gets a
                    // chance.
                    list.push_front(popped.value);
                    drop(slot);
                    queue.pop_front();
                }
            }
        }
    }

    /// Removes a specific waiter from the key's queue, by slot identity.
    fn remove_waiter(&self, key: &Bytes, waker_to_remove: &SharedWaker) {
        if let Some(mut queue) = self.waiters.get_mut(key) {
            queue.retain(|info| !Arc::ptr_eq(&info.waker, waker_to_remove));
            if queue.is_empty() {
                drop(queue);
                self.waiters.remove_if(key, |_, queue| queue.is_empty());
            }
        }
    }

    /// Removes all waiters for a session upon client disconnection.
    pub fn remove_waiters_for_session(&self, session_id: u64) {
        self.waiters.iter_mut().for_each(|mut queue| {
            queue.retain(|info| info.session_id != session_id);
        });
        self.waiters.retain(|_, queue| !queue.is_empty());
        debug!("Removed any pending blockers for session_id {session_id}.");
    }
}

fn pop_reply(key: Bytes, value: Bytes) -> RespValue {
    RespValue::Array(vec![
        RespValue::BulkString(key),
        RespValue::BulkString(value),
    ])
}
