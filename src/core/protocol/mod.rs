// src/core/protocol/mod.rs

//! The RESP wire protocol: frame types, codec, and the simplified reply
//! value used by the command layer.

pub mod resp_frame;
pub mod resp_value;

pub use resp_frame::{RespFrame, RespFrameCodec};
pub use resp_value::RespValue;
