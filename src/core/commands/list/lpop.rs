// src/core/commands/list/lpop.rs

//! Implements `LPOP key` and `LPOP key count`.
//!
//! The two arities reply differently on an empty or missing list: the
//! single-element form replies a null bulk, and the counted form ALSO
//! replies a null bulk — not an empty array.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct LPop {
    pub key: Bytes,
    pub count: Option<usize>,
}

impl ParseCommand for LPop {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        if args.is_empty() || args.len() > 2 {
            return Err(CitrineError::WrongArgumentCount("LPOP".to_string()));
        }
        let key = extract_bytes(&args[0])?;
        let count = match args.get(1) {
            Some(frame) => Some(extract_string(frame)?.parse()?),
            None => None,
        };
        Ok(LPop { key, count })
    }
}

#[async_trait]
impl ExecutableCommand for LPop {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        match self.count {
            None => match ctx.state.keyspace.lpop(&self.key)? {
                Some(value) => Ok(RespValue::BulkString(value)),
                None => Ok(RespValue::Null),
            },
            Some(count) => match ctx.state.keyspace.lpop_many(&self.key, count)? {
                Some(values) => Ok(RespValue::Array(
                    values.into_iter().map(RespValue::BulkString).collect(),
                )),
                None => Ok(RespValue::Null),
            },
        }
    }
}
