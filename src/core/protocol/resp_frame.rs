// src/core/protocol/resp_frame.rs

//! Implements the RESP (REdis Serialization Protocol) frame structure and the
//! corresponding `Encoder` and `Decoder` for network communication.
//!
//! The decoder is deliberately strict: clients only ever send commands, and a
//! command is an array of bulk strings. Anything else is a framing error and
//! the connection handler closes the connection without attempting to resync.

use crate::core::CitrineError;
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The CRLF (Carriage Return, Line Feed) sequence used to terminate lines in RESP.
const CRLF: &[u8] = b"\r\n";
const CRLF_LEN: usize = 2;

// Protocol-level limits to prevent denial-of-service from malformed frames.
const MAX_FRAME_ELEMENTS: usize = 1_024 * 1_024; // Max elements in a command array.
const MAX_BULK_STRING_SIZE: usize = 512 * 1024 * 1024; // 512MB max bulk string size.

/// An enum representing a single frame in the RESP protocol.
/// This is the low-level representation of data exchanged between the client
/// and server. Inbound traffic only ever produces `Array`-of-`BulkString`
/// frames; the remaining variants exist for replies.
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    /// `+s\r\n`. The string must not contain CR or LF.
    SimpleString(String),
    /// `-ERR<m>\r\n`. The encoder owns the `ERR` prefix; the message carries
    /// no separating space.
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    /// The null bulk string, `$-1\r\n`.
    Null,
    /// The null array, `*-1\r\n`.
    NullArray,
    Array(Vec<RespFrame>),
}

impl RespFrame {
    /// A convenience method to encode a frame into a `Vec<u8>`.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, CitrineError> {
        let mut buf = BytesMut::new();
        RespFrameCodec.encode(self.clone(), &mut buf)?;
        Ok(buf.to_vec())
    }
}

/// A `tokio_util::codec` implementation for encoding and decoding `RespFrame`s.
#[derive(Debug, Default)]
pub struct RespFrameCodec;

impl Encoder<RespFrame> for RespFrameCodec {
    type Error = CitrineError;

    /// Encodes a `RespFrame` into a `BytesMut` buffer according to the RESP
    /// specification. The `Framed` sink flushes the buffer to the socket, so
    /// large array replies are written out chunk by chunk rather than being
    /// copied again.
    fn encode(&mut self, item: RespFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            RespFrame::SimpleString(s) => {
                debug_assert!(
                    !s.bytes().any(|b| b == b'\r' || b == b'\n'),
                    "simple string must not contain CR or LF"
                );
                dst.extend_from_slice(b"+");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Error(s) => {
                dst.extend_from_slice(b"-ERR");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Integer(i) => {
                dst.extend_from_slice(b":");
                dst.extend_from_slice(i.to_string().as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::BulkString(b) => {
                dst.extend_from_slice(b"$");
                dst.extend_from_slice(b.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                dst.extend_from_slice(&b);
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Null => {
                dst.extend_from_slice(b"$-1\r\n");
            }
            RespFrame::NullArray => {
                dst.extend_from_slice(b"*-1\r\n");
            }
            RespFrame::Array(arr) => {
                dst.extend_from_slice(b"*");
                dst.extend_from_slice(arr.len().to_string().as_bytes());
                dst.extend_from_slice(CRLF);
                for frame in arr {
                    // Recursively encode each frame in the array.
                    self.encode(frame, dst)?;
                }
            }
        }
        Ok(())
    }
}

impl Decoder for RespFrameCodec {
    type Item = RespFrame;
    type Error = CitrineError;

    /// Decodes one command frame from a `BytesMut` buffer.
    ///
    /// Returns `Ok(None)` if the buffer does not yet contain a full frame,
    /// allowing the `Framed` stream to wait for more data from the network.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        match parse_command(src) {
            Ok((frame, len)) => {
                // Advance the buffer past the successfully parsed frame.
                src.advance(len);
                Ok(Some(frame))
            }
            // If the data is incomplete, wait for more data.
            Err(CitrineError::IncompleteData) => Ok(None),
            // For other errors, propagate them up to the connection handler,
            // which closes the connection.
            Err(e) => Err(e),
        }
    }
}

/// Parses one full command: `*<N>\r\n` followed by N bulk strings. N must be
/// at least 1, and every element must be a bulk string of length >= 0.
fn parse_command(src: &[u8]) -> Result<(RespFrame, usize), CitrineError> {
    if src[0] != b'*' {
        return Err(CitrineError::Protocol(format!(
            "expected array frame, got prefix byte {:#04x}",
            src[0]
        )));
    }

    let (line, len_of_line) = parse_line(&src[1..])?;
    let count = parse_decimal(line)?;
    if count < 1 {
        return Err(CitrineError::Protocol(format!(
            "invalid command array length {count}"
        )));
    }
    let count = count as usize;
    if count > MAX_FRAME_ELEMENTS {
        return Err(CitrineError::Protocol(format!(
            "command array length {count} exceeds limit"
        )));
    }

    let mut elements = Vec::with_capacity(count);
    let mut cursor = len_of_line + 1;
    for _ in 0..count {
        let (bulk, len) = parse_bulk_string(&src[cursor..])?;
        elements.push(bulk);
        cursor += len;
    }

    Ok((RespFrame::Array(elements), cursor))
}

/// Parses a single bulk string (e.g., `$5\r\nhello\r\n`).
fn parse_bulk_string(src: &[u8]) -> Result<(RespFrame, usize), CitrineError> {
    if src.is_empty() {
        return Err(CitrineError::IncompleteData);
    }
    if src[0] != b'$' {
        return Err(CitrineError::Protocol(format!(
            "expected bulk string, got prefix byte {:#04x}",
            src[0]
        )));
    }

    let (line, len_of_line) = parse_line(&src[1..])?;
    let str_len = parse_decimal(line)?;
    if str_len < 0 {
        return Err(CitrineError::Protocol(format!(
            "negative bulk string length {str_len}"
        )));
    }
    let str_len = str_len as usize;
    if str_len > MAX_BULK_STRING_SIZE {
        return Err(CitrineError::Protocol(format!(
            "bulk string length {str_len} exceeds limit"
        )));
    }

    let total_len_prefix = len_of_line + 1;
    // Check that the entire payload (including its final CRLF) is buffered.
    if src.len() < total_len_prefix + str_len + CRLF_LEN {
        return Err(CitrineError::IncompleteData);
    }

    // Validate the trailing CRLF.
    if &src[total_len_prefix + str_len..total_len_prefix + str_len + CRLF_LEN] != CRLF {
        return Err(CitrineError::Protocol(
            "bulk string payload not terminated by CRLF".to_string(),
        ));
    }

    let data = Bytes::copy_from_slice(&src[total_len_prefix..total_len_prefix + str_len]);
    Ok((RespFrame::BulkString(data), total_len_prefix + str_len + CRLF_LEN))
}

/// Helper function to find the next CRLF sequence in a buffer.
fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(CRLF_LEN).position(|window| window == CRLF)
}

/// Parses a single line (up to CRLF) from a buffer.
fn parse_line(src: &[u8]) -> Result<(&[u8], usize), CitrineError> {
    find_crlf(src)
        .map(|pos| (&src[..pos], pos + CRLF_LEN))
        .ok_or(CitrineError::IncompleteData)
}

/// Parses an ASCII decimal integer out of a header line.
fn parse_decimal(line: &[u8]) -> Result<i64, CitrineError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            CitrineError::Protocol(format!(
                "invalid length header {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}
