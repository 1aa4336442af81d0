// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::num::{ParseFloatError, ParseIntError};
use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
///
/// The `Display` text of a variant is what the client sees: the codec frames
/// every command-level error as `-ERR<message>\r\n`, so messages here carry
/// no `ERR` prefix of their own.
#[derive(Error, Debug)]
pub enum CitrineError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    /// Internal decoder sentinel: the buffer does not yet hold a full frame.
    /// The codec maps this to "wait for more bytes"; it never reaches a client.
    #[error("Incomplete data in stream")]
    IncompleteData,

    /// Malformed RESP framing. Fatal: the connection is closed without resync.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("unknown command")]
    UnknownCommand(String),

    #[error("syntax error")]
    SyntaxError,

    #[error("wrong number of arguments for '{0}' command")]
    WrongArgumentCount(String),

    #[error("Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("value is not an integer or out of range")]
    NotAnInteger,

    #[error("timeout is not a float or out of range")]
    NotAFloat,

    #[error("timeout is negative")]
    NegativeTimeout,

    #[error("Invalid stream ID specified as stream command argument")]
    InvalidStreamId,

    #[error("The ID specified in XADD must be greater than 0-0")]
    StreamIdNotPositive,

    #[error("The ID specified in XADD is equal or smaller than the target stream top item")]
    StreamIdTooSmall,

    #[error("wrong number of arguments for XADD: field-value list has odd length")]
    OddFieldValueCount,

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
// We wrap it in an Arc to allow for cheap, shared cloning.
impl Clone for CitrineError {
    fn clone(&self) -> Self {
        match self {
            CitrineError::Io(e) => CitrineError::Io(Arc::clone(e)),
            CitrineError::IncompleteData => CitrineError::IncompleteData,
            CitrineError::Protocol(s) => CitrineError::Protocol(s.clone()),
            CitrineError::UnknownCommand(s) => CitrineError::UnknownCommand(s.clone()),
            CitrineError::SyntaxError => CitrineError::SyntaxError,
            CitrineError::WrongArgumentCount(s) => CitrineError::WrongArgumentCount(s.clone()),
            CitrineError::WrongType => CitrineError::WrongType,
            CitrineError::NotAnInteger => CitrineError::NotAnInteger,
            CitrineError::NotAFloat => CitrineError::NotAFloat,
            CitrineError::NegativeTimeout => CitrineError::NegativeTimeout,
            CitrineError::InvalidStreamId => CitrineError::InvalidStreamId,
            CitrineError::StreamIdNotPositive => CitrineError::StreamIdNotPositive,
            CitrineError::StreamIdTooSmall => CitrineError::StreamIdTooSmall,
            CitrineError::OddFieldValueCount => CitrineError::OddFieldValueCount,
            CitrineError::Internal(s) => CitrineError::Internal(s.clone()),
        }
    }
}

impl CitrineError {
    /// Whether the error invalidates the connection's framing. Fatal errors
    /// close the connection; everything else is reported as a RESP error and
    /// the connection keeps processing commands.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CitrineError::Io(_) | CitrineError::Protocol(_) | CitrineError::IncompleteData
        )
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for CitrineError {
    fn from(e: std::io::Error) -> Self {
        CitrineError::Io(Arc::new(e))
    }
}

impl From<ParseIntError> for CitrineError {
    fn from(_: ParseIntError) -> Self {
        CitrineError::NotAnInteger
    }
}

impl From<ParseFloatError> for CitrineError {
    fn from(_: ParseFloatError) -> Self {
        CitrineError::NotAFloat
    }
}
