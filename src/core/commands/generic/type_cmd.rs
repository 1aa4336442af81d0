// src/core/commands/generic/type_cmd.rs

//! Implements the `TYPE` command.

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::{extract_bytes, validate_arg_count};
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, Default)]
pub struct TypeCmd {
    pub key: Bytes,
}

impl ParseCommand for TypeCmd {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        validate_arg_count(args, 1, "TYPE")?;
        Ok(TypeCmd {
            key: extract_bytes(&args[0])?,
        })
    }
}

#[async_trait]
impl ExecutableCommand for TypeCmd {
    async fn execute(&self, ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        let name = ctx.state.keyspace.type_name(&self.key);
        Ok(RespValue::SimpleString(name.to_string()))
    }
}
