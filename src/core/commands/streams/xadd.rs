// src/core/commands/streams/xadd.rs

//! Implements the `XADD` command for adding entries to a stream.
//!
//! `XADD key <* | ms-* | ms-seq> field value [field value ...]` appends one
//! entry and replies its id. The field-value list must have even length; the
//! check runs at parse time, before any key would be created.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, extract_string};
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::storage::stream::IdSpec;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct XAdd {
    pub key: Bytes,
    pub id: IdSpec,
    pub fields: Vec<Bytes>,
}

impl Default for XAdd {
    fn default() -> Self {
        Self {
            key: Bytes::new(),
            id: IdSpec::Auto,
            fields: Vec::new(),
        }
    }
}

impl ParseCommand for XAdd {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        if args.len() < 4 {
            return Err(CitrineError::WrongArgumentCount("XADD".to_string()));
        }
        let key = extract_bytes(&args[0])?;
        let id: IdSpec = extract_string(&args[1])?.parse()?;
        if (args.len() - 2) % 2 != 0 {
            return Err(CitrineError::OddFieldValueCount);
        }
        let fields = args[2..]
            .iter()
            .map(extract_bytes)
            .collect::<Result<_, _>>()?;
        Ok(XAdd { key, id, fields })
    }
}

#[async_trait]
impl ExecutableCommand for XAdd {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        let id = ctx
            .state
            .keyspace
            .xadd(&self.key, self.id, self.fields.clone())?;
        Ok(RespValue::BulkString(id.to_string().into()))
    }
}
