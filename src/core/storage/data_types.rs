// src/core/storage/data_types.rs

//! Defines the core data structures for storing values in the keyspace,
//! `StoredValue` and the `DataValue` enum.

use crate::core::storage::list::List;
use crate::core::storage::stream::Stream;
use bytes::Bytes;
use tokio::time::Instant;

/// A wrapper for all values stored in the keyspace: the data plus its
/// expiration metadata.
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub data: DataValue,
    /// The absolute monotonic instant at which the value is considered gone.
    /// Only ever set for strings; lists and streams never expire.
    pub expiry: Option<Instant>,
}

impl StoredValue {
    /// Creates a new `StoredValue` without an expiration.
    pub fn new(data: DataValue) -> Self {
        Self { data, expiry: None }
    }

    /// Checks whether the value is expired relative to the given instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }
}

/// The closed sum of value kinds a key can hold. The kind is fixed when the
/// key is created; an operation against the wrong kind is a domain error,
/// never a cast.
#[derive(Debug, Clone)]
pub enum DataValue {
    String(Bytes),
    List(List),
    Stream(Stream),
}

impl DataValue {
    /// The type name reported by the `TYPE` command.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::String(_) => "string",
            DataValue::List(_) => "list",
            DataValue::Stream(_) => "stream",
        }
    }
}
