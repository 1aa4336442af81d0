// src/core/storage/keyspace.rs

//! The keyspace: a single map from opaque byte keys to typed values, with
//! type-checked dispatch over the three value kinds and TTL scheduling.
//!
//! All operations here are short, non-suspending critical sections behind one
//! mutex that is never held across an await point. Under the one-task-at-a-
//! time execution model this makes every mutation atomic with respect to all
//! observers, including blocked clients being woken by it.

use crate::core::CitrineError;
use crate::core::blocking::BlockerManager;
use crate::core::storage::data_types::{DataValue, StoredValue};
use crate::core::storage::list::{List, PushDirection};
use crate::core::storage::stream::{IdSpec, RangeEnd, RangeStart, Stream, StreamEntry, StreamId};
use crate::core::storage::ttl;
use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;

/// The starting point of an `XREAD` on one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XReadStart {
    /// An exact id; entries strictly greater are returned.
    At(StreamId),
    /// `$` — resolved at registration time to the stream's then-current last
    /// id, so only entries appended after the call are returned.
    Last,
}

/// A watch on one stream a blocked `XREAD` holds while sleeping: the resolved
/// start id and a clone of the stream's notification handle.
#[derive(Debug, Clone)]
pub struct StreamWatch {
    pub key: Bytes,
    pub start: StreamId,
    pub notify: Arc<Notify>,
}

/// The outcome of the synchronous `XREAD` pass: the streams that produced
/// data, and watches for those that did not.
#[derive(Debug, Default)]
pub struct XReadPass {
    pub results: Vec<(Bytes, Vec<StreamEntry>)>,
    pub watches: Vec<StreamWatch>,
}

/// The process-local keyspace shared by all connection tasks.
#[derive(Debug, Default)]
pub struct Keyspace {
    entries: Mutex<HashMap<Bytes, StoredValue>>,
}

impl Keyspace {
    pub fn new() -> Self {
        Default::default()
    }

    /// Locks the underlying map. Used by the blocking dispatcher, whose
    /// check-then-register step must be atomic against the push-then-notify
    /// step running here.
    pub(crate) fn lock_entries(&self) -> MutexGuard<'_, HashMap<Bytes, StoredValue>> {
        self.entries.lock()
    }

    /// Writes a string value, replacing whatever was stored. With a TTL the
    /// expiry is an absolute instant and a deletion callback is scheduled for
    /// it; the callback is a no-op unless the stored value still carries this
    /// exact expiry.
    pub fn set(self: &Arc<Self>, key: Bytes, value: Bytes, ttl: Option<Duration>) {
        let expiry = ttl.map(|d| Instant::now() + d);
        debug!(
            "SET {:?} ({} bytes), ttl={:?}",
            String::from_utf8_lossy(&key),
            value.len(),
            ttl
        );
        self.entries.lock().insert(
            key.clone(),
            StoredValue {
                data: DataValue::String(value),
                expiry,
            },
        );
        if let Some(deadline) = expiry {
            ttl::schedule(self.clone(), key, deadline);
        }
    }

    /// Reads a string value. A missing or expired key reads as absent; an
    /// expired key is purged on the spot.
    pub fn get(&self, key: &Bytes) -> Result<Option<Bytes>, CitrineError> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        match &entry.data {
            DataValue::String(value) => {
                if entry.is_expired(Instant::now()) {
                    debug!("GET {:?}: lazily expired", String::from_utf8_lossy(key));
                    entries.remove(key);
                    Ok(None)
                } else {
                    Ok(Some(value.clone()))
                }
            }
            _ => Err(CitrineError::WrongType),
        }
    }

    /// The scheduled-expiry callback. Deletes the key only if the stored
    /// value is still a string carrying this exact deadline, so a value
    /// written in the interim is never deleted.
    pub(crate) fn delete_if_expired(&self, key: &Bytes, deadline: Instant) {
        let mut entries = self.entries.lock();
        let still_same = entries.get(key).is_some_and(|entry| {
            matches!(entry.data, DataValue::String(_)) && entry.expiry == Some(deadline)
        });
        if still_same {
            debug!(
                "scheduled expiry fired for {:?}",
                String::from_utf8_lossy(key)
            );
            entries.remove(key);
        }
    }

    /// Pushes values onto a list, creating it if absent, then hands the head
    /// to the first blocked waiter on the key (at most one per push call).
    /// Returns the length right after the push, before any hand-off pop.
    pub fn push(
        &self,
        key: &Bytes,
        values: &[Bytes],
        direction: PushDirection,
        blockers: &BlockerManager,
    ) -> Result<usize, CitrineError> {
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| StoredValue::new(DataValue::List(List::default())));
        let DataValue::List(list) = &mut entry.data else {
            return Err(CitrineError::WrongType);
        };
        let new_len = match direction {
            PushDirection::Left => list.lpush(values),
            PushDirection::Right => list.rpush(values),
        };
        // Still under the keyspace lock: the woken waiter observes exactly
        // the post-mutation state.
        blockers.serve_first_waiter(key, list);
        Ok(new_len)
    }

    /// Inclusive range read. A missing key reads as an empty list.
    pub fn lrange(&self, key: &Bytes, start: i64, stop: i64) -> Result<Vec<Bytes>, CitrineError> {
        match self.entries.lock().get(key) {
            None => Ok(Vec::new()),
            Some(entry) => match &entry.data {
                DataValue::List(list) => Ok(list.lrange(start, stop)),
                _ => Err(CitrineError::WrongType),
            },
        }
    }

    /// List length. A missing key reads as length 0.
    pub fn llen(&self, key: &Bytes) -> Result<usize, CitrineError> {
        match self.entries.lock().get(key) {
            None => Ok(0),
            Some(entry) => match &entry.data {
                DataValue::List(list) => Ok(list.llen()),
                _ => Err(CitrineError::WrongType),
            },
        }
    }

    /// Pops the head element. Missing key or empty list reads as absent.
    /// An emptied list stays present under its key.
    pub fn lpop(&self, key: &Bytes) -> Result<Option<Bytes>, CitrineError> {
        match self.entries.lock().get_mut(key) {
            None => Ok(None),
            Some(entry) => match &mut entry.data {
                DataValue::List(list) => Ok(list.lpop()),
                _ => Err(CitrineError::WrongType),
            },
        }
    }

    /// Pops up to `count` head elements. Missing key or empty list yields
    /// `None` (encoded as a null bulk, not an empty array).
    pub fn lpop_many(
        &self,
        key: &Bytes,
        count: usize,
    ) -> Result<Option<Vec<Bytes>>, CitrineError> {
        match self.entries.lock().get_mut(key) {
            None => Ok(None),
            Some(entry) => match &mut entry.data {
                DataValue::List(list) => {
                    if list.is_empty() {
                        Ok(None)
                    } else {
                        Ok(Some(list.lpop_many(count)))
                    }
                }
                _ => Err(CitrineError::WrongType),
            },
        }
    }

    /// The stored kind of a key, or "none". An expired string reads as
    /// absent and is purged.
    pub fn type_name(&self, key: &Bytes) -> &'static str {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            None => "none",
            Some(entry) => {
                if entry.is_expired(Instant::now()) {
                    entries.remove(key);
                    "none"
                } else {
                    entry.data.type_name()
                }
            }
        }
    }

    /// Appends an entry to a stream, creating the stream if absent. The
    /// even-length constraint on `fields` is validated at parse time, before
    /// any key is created.
    pub fn xadd(
        &self,
        key: &Bytes,
        id_spec: IdSpec,
        fields: Vec<Bytes>,
    ) -> Result<StreamId, CitrineError> {
        let mut entries = self.entries.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| StoredValue::new(DataValue::Stream(Stream::new())));
        let DataValue::Stream(stream) = &mut entry.data else {
            return Err(CitrineError::WrongType);
        };
        let id = stream.add(id_spec, fields)?;
        debug!("XADD {:?} -> {}", String::from_utf8_lossy(key), id);
        Ok(id)
    }

    /// Range read over a stream. Unlike the list operations, a missing key is
    /// an error here: a stream is required.
    pub fn xrange(
        &self,
        key: &Bytes,
        start: RangeStart,
        end: RangeEnd,
    ) -> Result<Vec<StreamEntry>, CitrineError> {
        match self.entries.lock().get(key) {
            Some(StoredValue {
                data: DataValue::Stream(stream),
                ..
            }) => Ok(stream.range(start, end)),
            _ => Err(CitrineError::WrongType),
        }
    }

    /// The synchronous `XREAD` pass: every listed key must hold a stream.
    /// Streams with entries past their start id contribute results; the rest
    /// contribute watches carrying the resolved start id (`$` resolves to the
    /// stream's current last id) and its notification handle.
    pub fn xread_resolve(
        &self,
        streams: &[(Bytes, XReadStart)],
    ) -> Result<XReadPass, CitrineError> {
        let entries = self.entries.lock();
        let mut pass = XReadPass::default();
        for (key, start) in streams {
            let Some(StoredValue {
                data: DataValue::Stream(stream),
                ..
            }) = entries.get(key)
            else {
                return Err(CitrineError::WrongType);
            };
            match start {
                XReadStart::At(id) => {
                    let found = stream.entries_after(*id);
                    if found.is_empty() {
                        pass.watches.push(StreamWatch {
                            key: key.clone(),
                            start: *id,
                            notify: stream.notify_handle(),
                        });
                    } else {
                        pass.results.push((key.clone(), found));
                    }
                }
                XReadStart::Last => pass.watches.push(StreamWatch {
                    key: key.clone(),
                    start: stream.last_id(),
                    notify: stream.notify_handle(),
                }),
            }
        }
        Ok(pass)
    }

    /// Re-reads the watched streams after a wakeup (or to close the
    /// registration gap), returning only those that produced data.
    pub fn xread_collect(
        &self,
        watches: &[StreamWatch],
    ) -> Result<Vec<(Bytes, Vec<StreamEntry>)>, CitrineError> {
        let entries = self.entries.lock();
        let mut results = Vec::new();
        for watch in watches {
            let Some(StoredValue {
                data: DataValue::Stream(stream),
                ..
            }) = entries.get(&watch.key)
            else {
                return Err(CitrineError::WrongType);
            };
            let found = stream.entries_after(watch.start);
            if !found.is_empty() {
                results.push((watch.key.clone(), found));
            }
        }
        Ok(results)
    }
}
