// src/core/commands/generic/ping.rs

use crate::core::commands::command_trait::{ExecutableCommand, ParseCommand};
use crate::core::commands::helpers::validate_arg_count;
use crate::core::protocol::RespFrame;
use crate::core::state::ExecutionContext;
use crate::core::{CitrineError, RespValue};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct Ping;

impl ParseCommand for Ping {
    fn parse(args: &[RespFrame]) -> Result<Self, CitrineError> {
        validate_arg_count(args, 0, "PING")?;
        Ok(Ping)
    }
}

#[async_trait]
impl ExecutableCommand for Ping {
    async fn execute(&self, _ctx: &mut ExecutionContext) -> Result<RespValue, CitrineError> {
        Ok(RespValue::SimpleString("PONG".to_string()))
    }
}
