// src/core/storage/stream.rs

use crate::core::CitrineError;
use bytes::Bytes;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Notify;

// --- Stream ID ---

/// The identity of a stream entry: milliseconds since the epoch plus a
/// per-millisecond sequence number. Ordering is lexicographic, time first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StreamId {
    pub timestamp_ms: u64,
    pub sequence: u64,
}

impl StreamId {
    pub const fn new(timestamp_ms: u64, sequence: u64) -> Self {
        Self {
            timestamp_ms,
            sequence,
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.timestamp_ms, self.sequence)
    }
}

impl FromStr for StreamId {
    type Err = CitrineError;

    /// Parses the full `<ms>-<seq>` form. Partial forms are handled by the
    /// callers that accept them (`XADD` templates, `XRANGE` bounds).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (time, seq) = s.split_once('-').ok_or(CitrineError::InvalidStreamId)?;
        let timestamp_ms = time.parse().map_err(|_| CitrineError::InvalidStreamId)?;
        let sequence = seq.parse().map_err(|_| CitrineError::InvalidStreamId)?;
        Ok(StreamId::new(timestamp_ms, sequence))
    }
}

/// The id argument of `XADD`: fully auto-generated, time given with an
/// auto-generated sequence, or fully specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpec {
    /// `*` — take the current wall-clock time.
    Auto,
    /// `<ms>-*` — the given time, sequence generated.
    AutoSequence(u64),
    /// `<ms>-<seq>` — validated against the stream's top item.
    Explicit(StreamId),
}

impl FromStr for IdSpec {
    type Err = CitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "*" {
            return Ok(IdSpec::Auto);
        }
        let (time, seq) = s.split_once('-').ok_or(CitrineError::InvalidStreamId)?;
        let timestamp_ms = time.parse().map_err(|_| CitrineError::InvalidStreamId)?;
        if seq == "*" {
            Ok(IdSpec::AutoSequence(timestamp_ms))
        } else {
            let sequence = seq.parse().map_err(|_| CitrineError::InvalidStreamId)?;
            Ok(IdSpec::Explicit(StreamId::new(timestamp_ms, sequence)))
        }
    }
}

/// An `XRANGE` lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStart {
    /// `-` — from the beginning of the stream.
    Min,
    /// `<ms>` — the first entry whose time is at least this.
    Time(u64),
    /// `<ms>-<seq>` — the first entry at or above this id.
    At(StreamId),
}

impl FromStr for RangeStart {
    type Err = CitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(RangeStart::Min)
        } else if s.contains('-') {
            Ok(RangeStart::At(s.parse()?))
        } else {
            Ok(RangeStart::Time(
                s.parse().map_err(|_| CitrineError::InvalidStreamId)?,
            ))
        }
    }
}

/// An `XRANGE` upper bound. Both the ms-only and the full-id forms are
/// inclusive; the ms-only form covers the whole millisecond window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// `+` — through the end of the stream.
    Max,
    Time(u64),
    At(StreamId),
}

impl FromStr for RangeEnd {
    type Err = CitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "+" {
            Ok(RangeEnd::Max)
        } else if s.contains('-') {
            Ok(RangeEnd::At(s.parse()?))
        } else {
            Ok(RangeEnd::Time(
                s.parse().map_err(|_| CitrineError::InvalidStreamId)?,
            ))
        }
    }
}

// --- Stream Entry ---

/// An immutable log record: id plus a flat field-value list. The list is
/// even-length in practice (`XADD` validates it), but nothing here interprets
/// the pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: StreamId,
    pub fields: Vec<Bytes>,
}

// --- Main Stream Struct ---

/// An append-only log of entries sorted by id, plus the edge-triggered
/// notification handle blocked `XREAD` clients wait on.
#[derive(Debug, Clone, Default)]
pub struct Stream {
    entries: Vec<StreamEntry>,
    notify: Arc<Notify>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of the newest entry, or `0-0` for an empty stream.
    pub fn last_id(&self) -> StreamId {
        self.entries.last().map(|e| e.id).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A clone of the notification handle. Waiters register on it before
    /// sleeping; `add` signals it once per append.
    pub fn notify_handle(&self) -> Arc<Notify> {
        self.notify.clone()
    }

    /// Appends an entry under the given id spec and signals the notification
    /// handle. The handle is edge-triggered: only waiters already registered
    /// observe the signal, so readers must re-check the log after the
    /// registration gap.
    pub fn add(&mut self, id_spec: IdSpec, fields: Vec<Bytes>) -> Result<StreamId, CitrineError> {
        let id = self.next_id(id_spec)?;
        self.entries.push(StreamEntry { id, fields });
        self.notify.notify_waiters();
        Ok(id)
    }

    fn next_id(&self, id_spec: IdSpec) -> Result<StreamId, CitrineError> {
        match id_spec {
            IdSpec::Auto => Ok(self.generate_sequence(unix_time_ms())),
            IdSpec::AutoSequence(timestamp_ms) => Ok(self.generate_sequence(timestamp_ms)),
            IdSpec::Explicit(id) => self.validate_explicit(id),
        }
    }

    /// Sequence generation for a proposed time `t`: if the top item's time is
    /// at or past `t` the clock went backwards (or stood still), so bump its
    /// sequence; otherwise start the new millisecond at sequence 0.
    fn generate_sequence(&self, timestamp_ms: u64) -> StreamId {
        let last = self.last_id();
        if last.timestamp_ms >= timestamp_ms {
            StreamId::new(last.timestamp_ms, last.sequence + 1)
        } else {
            StreamId::new(timestamp_ms, 0)
        }
    }

    fn validate_explicit(&self, id: StreamId) -> Result<StreamId, CitrineError> {
        if id <= StreamId::new(0, 0) {
            return Err(CitrineError::StreamIdNotPositive);
        }
        if id <= self.last_id() {
            return Err(CitrineError::StreamIdTooSmall);
        }
        Ok(id)
    }

    /// Entries within `[start, end]`, bisecting by time or full id as each
    /// bound requires.
    pub fn range(&self, start: RangeStart, end: RangeEnd) -> Vec<StreamEntry> {
        let lo = match start {
            RangeStart::Min => 0,
            RangeStart::Time(t) => self.entries.partition_point(|e| e.id.timestamp_ms < t),
            RangeStart::At(id) => self.entries.partition_point(|e| e.id < id),
        };
        let hi = match end {
            RangeEnd::Max => self.entries.len(),
            RangeEnd::Time(t) => self.entries.partition_point(|e| e.id.timestamp_ms <= t),
            RangeEnd::At(id) => self.entries.partition_point(|e| e.id <= id),
        };
        if lo >= hi {
            return Vec::new();
        }
        self.entries[lo..hi].to_vec()
    }

    /// Entries strictly greater than `after`. This is the `XREAD` tail read.
    pub fn entries_after(&self, after: StreamId) -> Vec<StreamEntry> {
        let lo = self.entries.partition_point(|e| e.id <= after);
        self.entries[lo..].to_vec()
    }
}

/// Wall-clock milliseconds since the epoch, used for auto-generated ids.
fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
