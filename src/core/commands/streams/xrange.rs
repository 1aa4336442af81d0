// src/core/commands/streams/xrange.rs

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string, validate_arg_count};
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::storage::stream::{RangeEnd, RangeStart, StreamEntry};
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct XRange {
    pub key: Bytes,
    pub start: RangeStart,
    pub end: RangeEnd,
}

impl Default for XRange {
    fn default() -> Self {
        Self {
            key: Bytes::new(),
            start: RangeStart::Min,
            end: RangeEnd::Max,
        }
    }
}

impl ParseCommand for XRange {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        validate_arg_count(args, 3, "XRANGE")?;
        Ok(XRange {
            key: extract_bytes(&args[0])?,
            start: extract_string(&args[1])?.parse()?,
            end: extract_string(&args[2])?.parse()?,
        })
    }
}

#[async_trait]
impl ExecutableCommand for XRange {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        let entries = ctx.state.keyspace.xrange(&self.key, self.start, self.end)?;
        Ok(RespValue::Array(
            entries.iter().map(format_entry).collect(),
        ))
    }
}

/// Formats one stream entry as `[id, [field, value, ...]]`.
pub(crate) fn format_entry(entry: &StreamEntry) -> RespValue {
    let fields = entry
        .fields
        .iter()
        .map(|f| RespValue::BulkString(f.clone()))
        .collect();
    RespValue::Array(vec![
        RespValue::BulkString(entry.id.to_string().into()),
        RespValue::Array(fields),
    ])
}
